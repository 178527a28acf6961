pub mod attempts;
pub mod class_users;
pub mod classes;
pub mod common;
pub mod notifications;
pub mod quizzes;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
