use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::debug;

use super::redact::redact_pages;
use super::{QuizService, load_quiz};
use crate::models::ErrorCode;
use crate::models::quizzes::responses::{QuizDetailResponse, QuizPages};
use crate::models::users::entities::User;
use crate::services::{EngineContext, ServiceError, current_user, respond};

/// 测验详情
///
/// 所属教师看到完整内容；班级成员看到去除答案的内容以及自己已用的作答次数。
pub async fn quiz_detail_for(
    ctx: &EngineContext,
    actor: &User,
    quiz_id: i64,
) -> Result<QuizDetailResponse, ServiceError> {
    let quiz = load_quiz(ctx, quiz_id).await?;
    let is_owner = ctx.access.is_teacher_owner_of(&quiz, actor).await?;

    if !is_owner && !ctx.access.is_accepted_member(quiz.class_id, actor.id).await? {
        return Err(ServiceError::forbidden(
            ErrorCode::ClassPermissionDenied,
            "您不是该班级成员，无权查看此测验",
        ));
    }

    let pages = ctx.storage.load_pages(quiz.id).await?;

    if is_owner {
        return Ok(QuizDetailResponse {
            quiz,
            pages: QuizPages::Full(pages),
            is_owner,
            attempts_used: None,
        });
    }

    debug!("Serving redacted quiz {} to user {}", quiz.id, actor.id);
    let attempts_used = ctx.storage.count_attempts(quiz.id, actor.id).await?;
    Ok(QuizDetailResponse {
        quiz,
        pages: QuizPages::Redacted(redact_pages(&pages)),
        is_owner,
        attempts_used: Some(attempts_used),
    })
}

pub async fn get_quiz(
    service: &QuizService,
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

    let result = quiz_detail_for(&ctx, &user, quiz_id).await;
    Ok(respond(result, StatusCode::OK, "查询成功"))
}
