use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{AttemptService, student_view};
use crate::models::ErrorCode;
use crate::models::attempts::requests::{AttemptListParams, AttemptListQuery};
use crate::models::attempts::responses::{AttemptListResponse, MyAttemptsResponse};
use crate::models::users::entities::User;
use crate::services::quizzes::{ensure_owner, load_quiz};
use crate::services::{EngineContext, ServiceError, current_user, respond};

/// 学生查看自己在某测验下的全部作答
pub async fn my_attempts_for(
    ctx: &EngineContext,
    actor: &User,
    quiz_id: i64,
) -> Result<MyAttemptsResponse, ServiceError> {
    let quiz = load_quiz(ctx, quiz_id).await?;

    if !ctx.access.is_accepted_member(quiz.class_id, actor.id).await? {
        return Err(ServiceError::forbidden(
            ErrorCode::ClassPermissionDenied,
            "您不是该班级成员",
        ));
    }

    let attempts = ctx.storage.list_student_attempts(quiz.id, actor.id).await?;
    let attempts_used = attempts.len() as i64;
    let attempts_remaining = quiz
        .attempts_allowed
        .map(|allowed| (i64::from(allowed) - attempts_used).max(0));
    let remain = attempts_remaining.is_none_or(|left| left > 0);
    let items = attempts
        .into_iter()
        .map(|attempt| student_view(attempt, remain))
        .collect();

    Ok(MyAttemptsResponse {
        items,
        attempts_used,
        attempts_remaining,
    })
}

/// 教师分页查看测验的全部作答，可按状态过滤
pub async fn quiz_attempts_for(
    ctx: &EngineContext,
    actor: &User,
    quiz_id: i64,
    params: AttemptListParams,
) -> Result<AttemptListResponse, ServiceError> {
    let quiz = load_quiz(ctx, quiz_id).await?;
    ensure_owner(ctx, &quiz, actor).await?;

    let (page, size) = params.pagination.normalized();
    let query = AttemptListQuery {
        page,
        size,
        quiz_id: quiz.id,
        status: params.status,
    };
    Ok(ctx.storage.list_attempts_with_pagination(query).await?)
}

pub async fn list_my_attempts(
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

    let result = my_attempts_for(&ctx, &user, quiz_id).await;
    Ok(respond(result, StatusCode::OK, "查询成功"))
}

pub async fn list_quiz_attempts(
    service: &AttemptService,
    request: &HttpRequest,
    quiz_id: i64,
    params: AttemptListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = quiz_attempts_for(&ctx, &user, quiz_id, params).await;
    Ok(respond(result, StatusCode::OK, "查询成功"))
}
