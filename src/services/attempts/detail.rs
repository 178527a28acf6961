use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{AttemptService, load_attempt, retries_remain, student_view};
use crate::models::ErrorCode;
use crate::models::attempts::entities::QuizAttempt;
use crate::models::users::entities::User;
use crate::services::quizzes::load_quiz;
use crate::services::{EngineContext, ServiceError, current_user, respond};

/// 作答详情：作答学生本人或测验所属教师可见
///
/// 学生仍可再次作答时，评分明细不含标准答案。
pub async fn attempt_detail_for(
    ctx: &EngineContext,
    actor: &User,
    attempt_id: i64,
) -> Result<QuizAttempt, ServiceError> {
    let attempt = load_attempt(ctx, attempt_id).await?;
    let quiz = load_quiz(ctx, attempt.quiz_id).await?;
    if attempt.student_id == actor.id {
        let remain = retries_remain(ctx, &quiz, actor.id).await?;
        return Ok(student_view(attempt, remain));
    }

    if ctx.access.is_teacher_owner_of(&quiz, actor).await? {
        Ok(attempt)
    } else {
        Err(ServiceError::forbidden(
            ErrorCode::AttemptNotOwned,
            "无权查看该作答记录",
        ))
    }
}

pub async fn get_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    attempt_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = attempt_detail_for(&ctx, &user, attempt_id).await;
    Ok(respond(result, StatusCode::OK, "查询成功"))
}
