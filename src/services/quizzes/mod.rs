pub mod coerce;
pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod normalize;
pub mod redact;
pub mod sanitize;
pub mod update;
pub mod validate;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EngineContext, ServiceError, context_from_request};
use crate::models::ErrorCode;
use crate::models::quizzes::entities::Quiz;
use crate::models::quizzes::requests::{CreateQuizRequest, QuizListParams, UpdateQuizRequest};
use crate::models::users::entities::User;

pub use normalize::normalize_to_pages;
pub use redact::redact_pages;
pub use sanitize::{IdGenerator, UuidIdGenerator, sanitize_question};

pub struct QuizService {
    context: Option<EngineContext>,
}

impl QuizService {
    pub fn new_lazy() -> Self {
        Self { context: None }
    }

    pub(crate) fn get_context(&self, request: &HttpRequest) -> Result<EngineContext, ServiceError> {
        match &self.context {
            Some(context) => Ok(context.clone()),
            None => context_from_request(request),
        }
    }

    pub async fn create_quiz(
        &self,
        request: &HttpRequest,
        req: CreateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_quiz(self, request, req).await
    }

    pub async fn get_quiz(&self, request: &HttpRequest, quiz_id: i64) -> ActixResult<HttpResponse> {
        detail::get_quiz(self, request, quiz_id).await
    }

    pub async fn list_class_quizzes(
        &self,
        request: &HttpRequest,
        class_id: i64,
        query: QuizListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_class_quizzes(self, request, class_id, query).await
    }

    pub async fn update_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        req: UpdateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_quiz(self, request, quiz_id, req).await
    }

    pub async fn delete_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_quiz(self, request, quiz_id).await
    }
}

/// 加载测验，不存在时返回 NotFound
pub(crate) async fn load_quiz(ctx: &EngineContext, quiz_id: i64) -> Result<Quiz, ServiceError> {
    ctx.storage
        .get_quiz_by_id(quiz_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(ErrorCode::QuizNotFound, "测验不存在"))
}

/// 要求当前用户为测验所属教师
pub(crate) async fn ensure_owner(
    ctx: &EngineContext,
    quiz: &Quiz,
    actor: &User,
) -> Result<(), ServiceError> {
    if ctx.access.is_teacher_owner_of(quiz, actor).await? {
        Ok(())
    } else {
        Err(ServiceError::forbidden(
            ErrorCode::QuizNotOwner,
            "只有测验所属教师可以执行此操作",
        ))
    }
}
