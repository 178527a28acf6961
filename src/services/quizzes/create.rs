use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::QuizService;
use super::normalize::normalize_to_pages;
use super::sanitize::{IdGenerator, UuidIdGenerator};
use super::validate::validate_quiz_fields;
use crate::models::ErrorCode;
use crate::models::quizzes::requests::CreateQuizRequest;
use crate::models::quizzes::responses::{QuizDetailResponse, QuizPages};
use crate::models::users::entities::User;
use crate::services::{EngineContext, ServiceError, current_user, respond};

/// 创建测验
///
/// 题目输入先规范化为页面，再与测验记录在同一事务中写入。
pub async fn create_quiz_for(
    ctx: &EngineContext,
    actor: &User,
    req: CreateQuizRequest,
    ids: &mut dyn IdGenerator,
) -> Result<QuizDetailResponse, ServiceError> {
    let fields = validate_quiz_fields(
        &req.title,
        req.description,
        req.attempts_allowed,
        req.start_time,
        req.end_time,
        req.time_limit_seconds,
    )?;

    if ctx.storage.get_class_by_id(req.class_id).await?.is_none() {
        return Err(ServiceError::not_found(ErrorCode::ClassNotFound, "班级不存在"));
    }

    if !ctx.access.is_class_teacher(req.class_id, actor).await? {
        return Err(ServiceError::forbidden(
            ErrorCode::ClassPermissionDenied,
            "只有班级教师可以创建测验",
        ));
    }

    let pages = normalize_to_pages(&req.questions, ids);
    let quiz = ctx
        .storage
        .create_quiz(req.class_id, actor.id, fields, pages.clone())
        .await?;

    info!(
        "Quiz {} created in class {} by user {} ({} pages)",
        quiz.id,
        quiz.class_id,
        actor.id,
        pages.len()
    );

    Ok(QuizDetailResponse {
        quiz,
        pages: QuizPages::Full(pages),
        is_owner: true,
        attempts_used: None,
    })
}

pub async fn create_quiz(
    service: &QuizService,
    request: &HttpRequest,
    req: CreateQuizRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = create_quiz_for(&ctx, &user, req, &mut UuidIdGenerator).await;
    Ok(respond(result, StatusCode::CREATED, "测验创建成功"))
}
