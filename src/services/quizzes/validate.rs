use chrono::{DateTime, Utc};

use crate::models::quizzes::requests::QuizFields;
use crate::services::error::ServiceError;

/// 作答时长上限：一年
pub const MAX_TIME_LIMIT_SECONDS: i64 = 365 * 24 * 60 * 60;

/// 校验测验策略字段，返回规范化后的字段
pub fn validate_quiz_fields(
    title: &str,
    description: Option<String>,
    attempts_allowed: Option<i32>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    time_limit_seconds: Option<i64>,
) -> Result<QuizFields, ServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::validation("测验标题不能为空"));
    }

    if let Some(allowed) = attempts_allowed
        && allowed < 1
    {
        return Err(ServiceError::validation("允许作答次数必须大于等于 1"));
    }

    if let Some(limit) = time_limit_seconds {
        if limit < 1 {
            return Err(ServiceError::validation("作答时长必须大于等于 1 秒"));
        }
        if limit > MAX_TIME_LIMIT_SECONDS {
            return Err(ServiceError::validation(format!(
                "作答时长不能超过 {MAX_TIME_LIMIT_SECONDS} 秒"
            )));
        }
    }

    if let (Some(start), Some(end)) = (start_time, end_time)
        && start >= end
    {
        return Err(ServiceError::validation("开始时间必须早于截止时间"));
    }

    Ok(QuizFields {
        title: title.to_string(),
        description: description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        attempts_allowed,
        start_time,
        end_time,
        time_limit_seconds,
    })
}
