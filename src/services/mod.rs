pub mod access;
pub mod attempts;
pub mod context;
pub mod error;
pub mod notify;
pub mod quizzes;

pub use access::{ClassroomAccess, StorageClassroomAccess};
pub use attempts::AttemptService;
pub use context::EngineContext;
pub use error::{PolicyViolation, ServiceError};
pub use notify::{Notifier, StorageNotifier};
pub use quizzes::QuizService;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde::Serialize;

use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

/// 从 app data 中读取引擎上下文
pub(crate) fn context_from_request(request: &HttpRequest) -> Result<EngineContext, ServiceError> {
    request
        .app_data::<web::Data<EngineContext>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| ServiceError::internal("EngineContext not found in app data"))
}

/// 当前登录用户，未登录时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录"))
    })
}

/// 把引擎结果转换为统一响应
pub(crate) fn respond<T: Serialize>(
    result: Result<T, ServiceError>,
    status: StatusCode,
    message: &str,
) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::build(status).json(ApiResponse::success(data, message)),
        Err(e) => e.into_response(),
    }
}
