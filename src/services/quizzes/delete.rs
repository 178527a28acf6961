use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{QuizService, ensure_owner, load_quiz};
use crate::models::{ApiResponse, ErrorCode};
use crate::models::users::entities::User;
use crate::services::{EngineContext, ServiceError, current_user};

/// 删除测验，页面与作答一并删除
pub async fn delete_quiz_for(
    ctx: &EngineContext,
    actor: &User,
    quiz_id: i64,
) -> Result<(), ServiceError> {
    let quiz = load_quiz(ctx, quiz_id).await?;
    ensure_owner(ctx, &quiz, actor).await?;

    if !ctx.storage.delete_quiz(quiz.id).await? {
        return Err(ServiceError::not_found(ErrorCode::QuizNotFound, "测验不存在"));
    }

    info!("Quiz {} deleted by user {}", quiz.id, actor.id);
    Ok(())
}

pub async fn delete_quiz(
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

    match delete_quiz_for(&ctx, &user, quiz_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("测验已删除"))),
        Err(e) => Ok(e.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempts::entities::NewAttempt;
    use crate::services::context::test_support::{classroom, open_fields, seed_quiz};
    use serde_json::json;

    #[tokio::test]
    async fn delete_cascades_to_pages_and_attempts() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), json!([{"text": "a"}])).await;
        let attempt = room
            .ctx
            .storage
            .create_attempt(NewAttempt {
                quiz_id: quiz.id,
                student_id: room.student.id,
                attempt_no: 1,
                started_at: chrono::Utc::now(),
                expires_at: None,
            })
            .await
            .unwrap();

        let err = delete_quiz_for(&room.ctx, &room.student, quiz.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::QuizNotOwner);

        delete_quiz_for(&room.ctx, &room.teacher, quiz.id)
            .await
            .unwrap();
        assert!(
            room
                .ctx
                .storage
                .get_quiz_by_id(quiz.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            room
                .ctx
                .storage
                .load_pages(quiz.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            room
                .ctx
                .storage
                .get_attempt_by_id(attempt.id)
                .await
                .unwrap()
                .is_none()
        );

        let err = delete_quiz_for(&room.ctx, &room.teacher, quiz.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::QuizNotFound);
    }
}
