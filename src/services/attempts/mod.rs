pub mod detail;
pub mod grade;
pub mod list;
pub mod scoring;
pub mod start;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::Value;

use super::{EngineContext, ServiceError, context_from_request};
use crate::models::ErrorCode;
use crate::models::attempts::entities::QuizAttempt;
use crate::models::attempts::requests::{
    AttemptListParams, GradeAttemptRequest, SubmitAttemptRequest,
};
use crate::models::quizzes::entities::Quiz;

pub use scoring::{ScoreOutcome, score_submission};

pub struct AttemptService {
    context: Option<EngineContext>,
}

impl AttemptService {
    pub fn new_lazy() -> Self {
        Self { context: None }
    }

    pub(crate) fn get_context(&self, request: &HttpRequest) -> Result<EngineContext, ServiceError> {
        match &self.context {
            Some(context) => Ok(context.clone()),
            None => context_from_request(request),
        }
    }

    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_attempt(self, request, quiz_id).await
    }

    pub async fn submit_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        req: SubmitAttemptRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_attempt(self, request, attempt_id, req).await
    }

    pub async fn grade_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        req: GradeAttemptRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_attempt(self, request, attempt_id, req).await
    }

    pub async fn list_my_attempts(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_my_attempts(self, request, quiz_id).await
    }

    pub async fn list_quiz_attempts(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        query: AttemptListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_quiz_attempts(self, request, quiz_id, query).await
    }

    pub async fn get_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_attempt(self, request, attempt_id).await
    }
}

/// 加载作答，不存在时返回 NotFound
pub(crate) async fn load_attempt(
    ctx: &EngineContext,
    attempt_id: i64,
) -> Result<QuizAttempt, ServiceError> {
    ctx.storage
        .get_attempt_by_id(attempt_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ErrorCode::AttemptNotFound, "作答记录不存在"))
}

/// 学生视图：仍有剩余作答次数时，评分明细中不返回标准答案
pub(crate) fn student_view(mut attempt: QuizAttempt, retries_left: bool) -> QuizAttempt {
    if retries_left && let Value::Object(entries) = &mut attempt.grading {
        for entry in entries.values_mut() {
            if let Value::Object(fields) = entry {
                fields.remove("expected");
            }
        }
    }
    attempt
}

/// 学生在该测验上是否还能再开始作答
pub(crate) async fn retries_remain(
    ctx: &EngineContext,
    quiz: &Quiz,
    student_id: i64,
) -> Result<bool, ServiceError> {
    match quiz.attempts_allowed {
        None => Ok(true),
        Some(allowed) => {
            let used = ctx.storage.count_attempts(quiz.id, student_id).await?;
            Ok(used < i64::from(allowed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempts::entities::AttemptStatus;
    use serde_json::json;

    fn graded_attempt() -> QuizAttempt {
        let now = chrono::Utc::now();
        QuizAttempt {
            id: 1,
            quiz_id: 1,
            student_id: 2,
            attempt_no: 1,
            status: AttemptStatus::Completed,
            started_at: now,
            expires_at: None,
            submitted_at: Some(now),
            score: Some(0.0),
            answers: json!({"q1": "0"}),
            grading: json!({
                "q1": {"correct": false, "given": "0", "expected": "1", "scored": true},
                "e": {"requiresManualGrading": true, "answer": "essay", "scored": false}
            }),
            grader_id: None,
            graded_at: None,
            comment: None,
        }
    }

    #[test]
    fn student_view_hides_expected_answers_while_retries_remain() {
        let view = student_view(graded_attempt(), true);
        assert_eq!(
            view.grading["q1"],
            json!({"correct": false, "given": "0", "scored": true})
        );
        assert_eq!(view.grading["e"]["answer"], "essay");

        let last = student_view(graded_attempt(), false);
        assert_eq!(last.grading["q1"]["expected"], "1");
    }
}
