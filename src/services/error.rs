//! 测验引擎错误
//!
//! 授权与策略错误在任何写操作之前检查；内部错误只记录日志，不向调用方暴露细节。

use actix_web::HttpResponse;
use std::fmt;
use tracing::error;

use crate::errors::QuizSystemError;
use crate::models::{ApiResponse, ErrorCode};

/// 作答策略违规，每种情况对应独立的错误码
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    AttemptLimitReached { allowed: i32 },
    QuizNotYetOpen,
    QuizClosed,
    AlreadySubmitted,
    Expired,
    EmptySubmission,
    NotSubmitted,
}

impl PolicyViolation {
    pub fn code(&self) -> ErrorCode {
        match self {
            PolicyViolation::AttemptLimitReached { .. } => ErrorCode::AttemptLimitReached,
            PolicyViolation::QuizNotYetOpen => ErrorCode::QuizNotYetOpen,
            PolicyViolation::QuizClosed => ErrorCode::QuizClosed,
            PolicyViolation::AlreadySubmitted => ErrorCode::AttemptAlreadySubmitted,
            PolicyViolation::Expired => ErrorCode::AttemptExpired,
            PolicyViolation::EmptySubmission => ErrorCode::EmptySubmission,
            PolicyViolation::NotSubmitted => ErrorCode::AttemptNotSubmitted,
        }
    }

    pub fn message(&self) -> String {
        match self {
            PolicyViolation::AttemptLimitReached { allowed } => {
                format!("已达到作答次数上限（{allowed} 次）")
            }
            PolicyViolation::QuizNotYetOpen => "测验尚未开始".to_string(),
            PolicyViolation::QuizClosed => "测验已截止".to_string(),
            PolicyViolation::AlreadySubmitted => "该作答已提交".to_string(),
            PolicyViolation::Expired => "作答已超时".to_string(),
            PolicyViolation::EmptySubmission => "提交内容为空".to_string(),
            PolicyViolation::NotSubmitted => "作答尚未提交，无法批改".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ServiceError {
    NotFound(ErrorCode, String),
    Forbidden(ErrorCode, String),
    PolicyViolation(PolicyViolation),
    Validation(String),
    Internal(String),
}

impl ServiceError {
    pub fn not_found(code: ErrorCode, msg: impl Into<String>) -> Self {
        ServiceError::NotFound(code, msg.into())
    }

    pub fn forbidden(code: ErrorCode, msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(code, msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ServiceError::Internal(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::NotFound(code, _) | ServiceError::Forbidden(code, _) => *code,
            ServiceError::PolicyViolation(violation) => violation.code(),
            ServiceError::Validation(_) => ErrorCode::ValidationFailed,
            ServiceError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// 转换为 HTTP 响应
    pub fn into_response(self) -> HttpResponse {
        let code = self.code();
        match self {
            ServiceError::NotFound(_, msg) => {
                HttpResponse::NotFound().json(ApiResponse::error_empty(code, msg))
            }
            ServiceError::Forbidden(_, msg) => {
                HttpResponse::Forbidden().json(ApiResponse::error_empty(code, msg))
            }
            ServiceError::PolicyViolation(violation) => {
                HttpResponse::BadRequest().json(ApiResponse::error_empty(code, violation.message()))
            }
            ServiceError::Validation(msg) => {
                HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
            }
            ServiceError::Internal(msg) => {
                error!("Quiz engine internal error: {}", msg);
                HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(code, "服务器内部错误，请稍后重试"))
            }
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::NotFound(_, msg)
            | ServiceError::Forbidden(_, msg)
            | ServiceError::Validation(msg)
            | ServiceError::Internal(msg) => write!(f, "{msg}"),
            ServiceError::PolicyViolation(violation) => write!(f, "{}", violation.message()),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<PolicyViolation> for ServiceError {
    fn from(violation: PolicyViolation) -> Self {
        ServiceError::PolicyViolation(violation)
    }
}

impl From<QuizSystemError> for ServiceError {
    fn from(err: QuizSystemError) -> Self {
        ServiceError::Internal(err.format_simple())
    }
}
