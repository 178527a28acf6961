use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::AttemptService;
use crate::models::ErrorCode;
use crate::models::attempts::entities::{NewAttempt, QuizAttempt};
use crate::models::users::entities::User;
use crate::services::quizzes::load_quiz;
use crate::services::{EngineContext, PolicyViolation, ServiceError, current_user, respond};

/// 开始一次作答
///
/// 次数检查与插入之间没有锁，由 (quiz_id, student_id, attempt_no) 唯一索引兜底：
/// 序号冲突时重新计数、重新检查次数上限后再试。
pub async fn start_attempt_for(
    ctx: &EngineContext,
    actor: &User,
    quiz_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizAttempt, ServiceError> {
    let quiz = load_quiz(ctx, quiz_id).await?;

    if !ctx.access.is_accepted_member(quiz.class_id, actor.id).await? {
        return Err(ServiceError::forbidden(
            ErrorCode::ClassPermissionDenied,
            "您不是该班级成员，无法参加此测验",
        ));
    }

    if quiz.is_not_yet_open_at(now) {
        debug!("Quiz {} not yet open for user {}", quiz.id, actor.id);
        return Err(PolicyViolation::QuizNotYetOpen.into());
    }
    if quiz.is_closed_at(now) {
        debug!("Quiz {} closed for user {}", quiz.id, actor.id);
        return Err(PolicyViolation::QuizClosed.into());
    }

    let expires_at = quiz
        .time_limit_seconds
        .map(|secs| {
            Duration::try_seconds(secs)
                .and_then(|limit| now.checked_add_signed(limit))
                .ok_or_else(|| {
                    ServiceError::internal(format!(
                        "time limit {secs}s of quiz {} is out of range",
                        quiz.id
                    ))
                })
        })
        .transpose()?;

    for _ in 0..ctx.config.start_retry_limit.max(1) {
        let used = ctx.storage.count_attempts(quiz.id, actor.id).await?;
        if let Some(allowed) = quiz.attempts_allowed
            && used >= i64::from(allowed)
        {
            info!(
                "User {} reached attempt limit {} on quiz {}",
                actor.id, allowed, quiz.id
            );
            return Err(PolicyViolation::AttemptLimitReached { allowed }.into());
        }

        let new_attempt = NewAttempt {
            quiz_id: quiz.id,
            student_id: actor.id,
            attempt_no: (used + 1) as i32,
            started_at: now,
            expires_at,
        };

        match ctx.storage.create_attempt(new_attempt).await {
            Ok(attempt) => {
                info!(
                    "User {} started attempt {} (#{}) on quiz {}",
                    actor.id, attempt.id, attempt.attempt_no, quiz.id
                );
                return Ok(attempt);
            }
            Err(e) if e.is_unique_violation() => {
                debug!(
                    "Attempt number {} on quiz {} taken concurrently, retrying",
                    used + 1,
                    quiz.id
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::internal(format!(
        "start attempt on quiz {} for user {} kept conflicting",
        quiz.id, actor.id
    )))
}

pub async fn start_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = start_attempt_for(&ctx, &user, quiz_id, Utc::now()).await;
    Ok(respond(result, StatusCode::CREATED, "作答已开始"))
}
