use crate::models::attempts::entities::QuizAttempt;
use crate::models::common::pagination::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AttemptListResponse {
    pub items: Vec<QuizAttempt>,
    pub pagination: PaginationInfo,
}

/// 学生自己的作答记录
#[derive(Debug, Serialize)]
pub struct MyAttemptsResponse {
    pub items: Vec<QuizAttempt>,
    // 已用次数
    pub attempts_used: i64,
    // 剩余次数，不限次数时为 None
    pub attempts_remaining: Option<i64>,
}
