use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::normalize::normalize_to_pages;
use super::sanitize::{IdGenerator, UuidIdGenerator};
use super::validate::validate_quiz_fields;
use super::{QuizService, ensure_owner, load_quiz};
use crate::models::ErrorCode;
use crate::models::quizzes::requests::UpdateQuizRequest;
use crate::models::quizzes::responses::{QuizDetailResponse, QuizPages};
use crate::models::users::entities::User;
use crate::services::{EngineContext, ServiceError, current_user, respond};

/// 整体更新测验
///
/// 提供 `questions` 时页面整体替换，与字段更新处于同一事务。
pub async fn update_quiz_for(
    ctx: &EngineContext,
    actor: &User,
    quiz_id: i64,
    req: UpdateQuizRequest,
    ids: &mut dyn IdGenerator,
) -> Result<QuizDetailResponse, ServiceError> {
    let quiz = load_quiz(ctx, quiz_id).await?;
    ensure_owner(ctx, &quiz, actor).await?;

    let fields = validate_quiz_fields(
        &req.title,
        req.description,
        req.attempts_allowed,
        req.start_time,
        req.end_time,
        req.time_limit_seconds,
    )?;
    let new_pages = req.questions.map(|raw| normalize_to_pages(&raw, ids));
    let replaced = new_pages.as_ref().map(Vec::len);

    let updated = ctx
        .storage
        .update_quiz(quiz.id, fields, new_pages)
        .await?
        .ok_or_else(|| ServiceError::not_found(ErrorCode::QuizNotFound, "测验不存在"))?;

    match replaced {
        Some(count) => info!(
            "Quiz {} updated by user {}, pages replaced ({} pages)",
            updated.id, actor.id, count
        ),
        None => info!("Quiz {} updated by user {}", updated.id, actor.id),
    }

    let pages = ctx.storage.load_pages(updated.id).await?;
    Ok(QuizDetailResponse {
        quiz: updated,
        pages: QuizPages::Full(pages),
        is_owner: true,
        attempts_used: None,
    })
}

pub async fn update_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    req: UpdateQuizRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = update_quiz_for(&ctx, &user, quiz_id, req, &mut UuidIdGenerator).await;
    Ok(respond(result, StatusCode::OK, "测验更新成功"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::test_support::{classroom, open_fields, seed_quiz};
    use crate::services::quizzes::sanitize::tests::SequentialIds;
    use serde_json::{Value, json};

    fn update(title: &str, questions: Option<Value>) -> UpdateQuizRequest {
        UpdateQuizRequest {
            title: title.to_string(),
            description: Some("desc".to_string()),
            attempts_allowed: Some(2),
            start_time: None,
            end_time: None,
            time_limit_seconds: None,
            questions,
        }
    }

    #[tokio::test]
    async fn omitted_questions_keep_pages() {
        let room = classroom().await;
        let mut fields = open_fields();
        fields.time_limit_seconds = Some(600);
        let quiz = seed_quiz(&room, fields, json!([{"text": "a"}, {"text": "b"}])).await;

        let detail = update_quiz_for(
            &room.ctx,
            &room.teacher,
            quiz.id,
            update("Renamed", None),
            &mut SequentialIds::default(),
        )
        .await
        .unwrap();

        assert_eq!(detail.quiz.title, "Renamed");
        assert_eq!(detail.quiz.attempts_allowed, Some(2));
        // 整体替换：未提供的策略字段被清空
        assert_eq!(detail.quiz.time_limit_seconds, None);
        let QuizPages::Full(pages) = detail.pages else {
            panic!("owner should see full pages");
        };
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].questions.len(), 2);
    }

    #[tokio::test]
    async fn provided_questions_replace_all_pages() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), json!([{"text": "old"}])).await;

        let new_content = json!({"pages": [
            {"title": "One", "questions": [{"text": "x"}]},
            {"title": "Two", "questions": [{"text": "y"}, {"text": "z"}]}
        ]});
        update_quiz_for(
            &room.ctx,
            &room.teacher,
            quiz.id,
            update("Quiz", Some(new_content)),
            &mut SequentialIds::default(),
        )
        .await
        .unwrap();

        let pages = room.ctx.storage.load_pages(quiz.id).await.unwrap();
        let titles: Vec<_> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two"]);
        assert_eq!(pages[1].questions[1].text, "z");
    }

    #[tokio::test]
    async fn non_owner_cannot_update() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), json!([])).await;

        let err = update_quiz_for(
            &room.ctx,
            &room.student,
            quiz.id,
            update("Hacked", None),
            &mut SequentialIds::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::QuizNotOwner);

        let unchanged = room
            .ctx
            .storage
            .get_quiz_by_id(quiz.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.title, "Quiz");
    }
}
