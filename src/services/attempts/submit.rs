use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::scoring::score_submission;
use super::{AttemptService, load_attempt, retries_remain, student_view};
use crate::errors::QuizSystemError;
use crate::models::ErrorCode;
use crate::models::attempts::entities::{AttemptStatus, AttemptSubmission, QuizAttempt};
use crate::models::attempts::requests::SubmitAttemptRequest;
use crate::models::notifications::entities::{NotificationRequest, NotificationType};
use crate::models::users::entities::User;
use crate::services::quizzes::load_quiz;
use crate::services::{EngineContext, PolicyViolation, ServiceError, current_user, respond};

/// 答案必须是对象，或内容为 JSON 对象的字符串
fn parse_answers(raw: Value) -> Result<Map<String, Value>, PolicyViolation> {
    match raw {
        Value::Object(map) => Ok(map),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(PolicyViolation::EmptySubmission),
        },
        _ => Err(PolicyViolation::EmptySubmission),
    }
}

fn rejection_for(status: AttemptStatus) -> PolicyViolation {
    match status {
        AttemptStatus::Expired => PolicyViolation::Expired,
        _ => PolicyViolation::AlreadySubmitted,
    }
}

/// 提交作答并自动评分
///
/// 最终写入以 `status = in_progress` 为条件；并发提交中落败的一方
/// 重新读取状态后报告“已提交”或“已超时”，且不发送通知。
pub async fn submit_attempt_for(
    ctx: &EngineContext,
    actor: &User,
    attempt_id: i64,
    req: SubmitAttemptRequest,
    now: DateTime<Utc>,
) -> Result<QuizAttempt, ServiceError> {
    let attempt = load_attempt(ctx, attempt_id).await?;

    if attempt.student_id != actor.id {
        return Err(ServiceError::forbidden(
            ErrorCode::AttemptNotOwned,
            "只能提交自己的作答",
        ));
    }

    if attempt.status != AttemptStatus::InProgress {
        info!(
            "Rejected submission of attempt {} in status {}",
            attempt.id, attempt.status
        );
        return Err(rejection_for(attempt.status).into());
    }

    if attempt.is_expired_at(now) {
        if ctx.storage.mark_attempt_expired(attempt.id).await? {
            info!("Attempt {} expired before submission", attempt.id);
        }
        return Err(PolicyViolation::Expired.into());
    }

    let answers = parse_answers(req.answers)?;
    let quiz = load_quiz(ctx, attempt.quiz_id).await?;
    let pages = ctx.storage.load_pages(quiz.id).await?;
    let outcome = score_submission(pages.iter().flat_map(|page| &page.questions), &answers);

    let grading = serde_json::to_value(&outcome.grading).map_err(QuizSystemError::from)?;
    let submission = AttemptSubmission {
        status: outcome.status,
        score: outcome.score,
        answers: Value::Object(answers),
        grading,
        submitted_at: now,
    };

    if !ctx.storage.submit_attempt(attempt.id, submission).await? {
        let current = load_attempt(ctx, attempt.id).await?;
        warn!(
            "Attempt {} was finalized concurrently (now {})",
            attempt.id, current.status
        );
        return Err(rejection_for(current.status).into());
    }

    info!(
        "Attempt {} on quiz {} submitted by user {}: status {}, score {:?}",
        attempt.id, quiz.id, actor.id, outcome.status, outcome.score
    );

    let submitter = actor
        .display_name
        .clone()
        .unwrap_or_else(|| actor.username.clone());
    let (notification_type, message) = if outcome.status == AttemptStatus::NeedsGrading {
        (
            NotificationType::QuizNeedsGrading,
            format!("{submitter} 提交了测验《{}》，需要人工批改", quiz.title),
        )
    } else {
        (
            NotificationType::QuizSubmitted,
            format!("{submitter} 提交了测验《{}》", quiz.title),
        )
    };
    ctx.notify(NotificationRequest {
        recipient_id: quiz.created_by,
        sender_id: Some(actor.id),
        notification_type,
        message,
        link: Some(format!("/attempts/{}", attempt.id)),
    })
    .await;

    let submitted = load_attempt(ctx, attempt.id).await?;
    let remain = retries_remain(ctx, &quiz, actor.id).await?;
    Ok(student_view(submitted, remain))
}

pub async fn submit_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    attempt_id: i64,
    req: SubmitAttemptRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = submit_attempt_for(&ctx, &user, attempt_id, req, Utc::now()).await;
    Ok(respond(result, StatusCode::OK, "提交成功"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::attempts::start::start_attempt_for;
    use crate::services::context::test_support::{classroom, open_fields, seed_quiz};
    use chrono::Duration;
    use serde_json::json;

    fn single_choice() -> Value {
        json!([{
            "id": "q1",
            "type": "multiple_choice",
            "options": ["A", "B"],
            "correctAnswer": "1"
        }])
    }

    fn answers(value: Value) -> SubmitAttemptRequest {
        SubmitAttemptRequest { answers: value }
    }

    #[test]
    fn answers_must_be_an_object() {
        assert!(parse_answers(json!({})).is_ok());
        assert_eq!(parse_answers(json!(r#"{"q1": "1"}"#)).unwrap()["q1"], "1");
        for bad in [json!(null), json!([]), json!("plain text"), json!(3)] {
            assert_eq!(parse_answers(bad), Err(PolicyViolation::EmptySubmission));
        }
    }

    #[tokio::test]
    async fn correct_answer_scores_full_and_notifies_teacher() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), single_choice()).await;
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, Utc::now())
            .await
            .unwrap();

        let done = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "1"})),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(done.status, AttemptStatus::Completed);
        assert_eq!(done.score, Some(100.0));
        assert_eq!(done.grading["q1"]["correct"], true);
        assert!(done.submitted_at.is_some());

        let inbox = room
            .ctx
            .storage
            .list_user_notifications(room.teacher.id)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification_type, "quiz_submitted");
        assert_eq!(inbox[0].sender_id, Some(room.student.id));
    }

    #[tokio::test]
    async fn wrong_answer_scores_zero() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), single_choice()).await;
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, Utc::now())
            .await
            .unwrap();

        let done = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "0"})),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(done.score, Some(0.0));
    }

    #[tokio::test]
    async fn manual_questions_need_grading() {
        let room = classroom().await;
        let quiz = seed_quiz(
            &room,
            open_fields(),
            json!([
                {"id": "e1", "type": "paragraph", "requiresManualGrading": true},
                {"id": "e2", "type": "short_answer", "correctAnswer": "x",
                 "requiresManualGrading": true}
            ]),
        )
        .await;
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, Utc::now())
            .await
            .unwrap();

        let done = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"e1": "essay", "e2": "x"})),
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(done.status, AttemptStatus::NeedsGrading);
        assert_eq!(done.score, None);

        let inbox = room
            .ctx
            .storage
            .list_user_notifications(room.teacher.id)
            .await
            .unwrap();
        assert_eq!(inbox[0].notification_type, "quiz_needs_grading");
    }

    #[tokio::test]
    async fn second_submission_is_rejected_without_changes() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), single_choice()).await;
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, Utc::now())
            .await
            .unwrap();

        submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "1"})),
            Utc::now(),
        )
        .await
        .unwrap();

        let err = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "0"})),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AttemptAlreadySubmitted);

        let stored = room
            .ctx
            .storage
            .get_attempt_by_id(attempt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.score, Some(100.0));
        assert_eq!(stored.answers, json!({"q1": "1"}));
    }

    #[tokio::test]
    async fn submission_within_final_second_is_accepted() {
        let room = classroom().await;
        let mut fields = open_fields();
        fields.time_limit_seconds = Some(60);
        let quiz = seed_quiz(&room, fields, single_choice()).await;
        let started = DateTime::from_timestamp(Utc::now().timestamp(), 700_000_000).unwrap();
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, started)
            .await
            .unwrap();

        let submitted = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "1"})),
            started + Duration::seconds(60),
        )
        .await
        .unwrap();
        assert_eq!(submitted.status, AttemptStatus::Completed);
    }

    #[tokio::test]
    async fn late_submission_expires_attempt() {
        let room = classroom().await;
        let mut fields = open_fields();
        fields.time_limit_seconds = Some(60);
        let quiz = seed_quiz(&room, fields, single_choice()).await;
        let started = Utc::now();
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, started)
            .await
            .unwrap();

        let err = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "1"})),
            started + Duration::seconds(120),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AttemptExpired);

        let stored = room
            .ctx
            .storage
            .get_attempt_by_id(attempt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AttemptStatus::Expired);
        assert_eq!(stored.score, None);

        // 超时后再次提交仍然报告超时
        let err = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "1"})),
            started,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AttemptExpired);
    }

    #[tokio::test]
    async fn only_owner_may_submit_and_empty_is_rejected() {
        let room = classroom().await;
        let quiz = seed_quiz(&room, open_fields(), single_choice()).await;
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, Utc::now())
            .await
            .unwrap();

        let err = submit_attempt_for(
            &room.ctx,
            &room.teacher,
            attempt.id,
            answers(json!({"q1": "1"})),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AttemptNotOwned);

        let err = submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(Value::Null),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptySubmission);

        let stored = room
            .ctx
            .storage
            .get_attempt_by_id(attempt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AttemptStatus::InProgress);
    }

    #[tokio::test]
    async fn notifications_can_be_disabled() {
        let mut room = classroom().await;
        room.ctx.config.notifications_enabled = false;
        let quiz = seed_quiz(&room, open_fields(), single_choice()).await;
        let attempt = start_attempt_for(&room.ctx, &room.student, quiz.id, Utc::now())
            .await
            .unwrap();

        submit_attempt_for(
            &room.ctx,
            &room.student,
            attempt.id,
            answers(json!({"q1": "1"})),
            Utc::now(),
        )
        .await
        .unwrap();

        let inbox = room
            .ctx
            .storage
            .list_user_notifications(room.teacher.id)
            .await
            .unwrap();
        assert!(inbox.is_empty());
    }
}
