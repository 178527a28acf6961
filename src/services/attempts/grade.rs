use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{AttemptService, load_attempt};
use crate::models::ErrorCode;
use crate::models::attempts::entities::{AttemptGrade, QuizAttempt};
use crate::models::attempts::requests::GradeAttemptRequest;
use crate::models::notifications::entities::{NotificationRequest, NotificationType};
use crate::models::users::entities::User;
use crate::services::quizzes::coerce::loose_number;
use crate::services::quizzes::{ensure_owner, load_quiz};
use crate::services::{EngineContext, PolicyViolation, ServiceError, current_user, respond};

/// 教师覆盖评分
///
/// 只接受已提交（completed / needs_grading）的作答，结果一律为 completed。
/// 分数按数字解析，无法解析时记为 0，不做范围检查。
/// 得分、评分明细与评语整体覆盖，未提供的 grading / comment 会被清空。
pub async fn grade_attempt_for(
    ctx: &EngineContext,
    actor: &User,
    attempt_id: i64,
    req: GradeAttemptRequest,
    now: DateTime<Utc>,
) -> Result<QuizAttempt, ServiceError> {
    let attempt = load_attempt(ctx, attempt_id).await?;
    let quiz = load_quiz(ctx, attempt.quiz_id).await?;
    ensure_owner(ctx, &quiz, actor).await?;

    if !attempt.status.is_submitted() {
        info!(
            "Rejected grading of attempt {} in status {}",
            attempt.id, attempt.status
        );
        return Err(PolicyViolation::NotSubmitted.into());
    }

    let score = loose_number(&req.score).unwrap_or(0.0);
    let grade = AttemptGrade {
        score,
        grading: req.grading,
        comment: req.comment,
        grader_id: actor.id,
        graded_at: now,
    };

    let graded = ctx
        .storage
        .grade_attempt(attempt.id, grade)
        .await?
        .ok_or_else(|| ServiceError::not_found(ErrorCode::AttemptNotFound, "作答记录不存在"))?;

    info!(
        "Attempt {} on quiz {} graded by user {}: score {}",
        graded.id, quiz.id, actor.id, score
    );

    ctx.notify(NotificationRequest {
        recipient_id: graded.student_id,
        sender_id: Some(actor.id),
        notification_type: NotificationType::QuizGraded,
        message: format!("测验《{}》已批改，得分 {}", quiz.title, score),
        link: Some(format!("/attempts/{}", graded.id)),
    })
    .await;

    Ok(graded)
}

pub async fn grade_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    attempt_id: i64,
    req: GradeAttemptRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = grade_attempt_for(&ctx, &user, attempt_id, req, Utc::now()).await;
    Ok(respond(result, StatusCode::OK, "批改成功"))
}
