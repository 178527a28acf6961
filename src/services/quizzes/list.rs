use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::QuizService;
use crate::models::ErrorCode;
use crate::models::quizzes::requests::{QuizListParams, QuizListQuery};
use crate::models::quizzes::responses::QuizListResponse;
use crate::models::users::entities::User;
use crate::services::{EngineContext, ServiceError, current_user, respond};

/// 分页列出班级测验，班级成员与班级教师可见
pub async fn list_class_quizzes_for(
    ctx: &EngineContext,
    actor: &User,
    class_id: i64,
    params: QuizListParams,
) -> Result<QuizListResponse, ServiceError> {
    if ctx.storage.get_class_by_id(class_id).await?.is_none() {
        return Err(ServiceError::not_found(ErrorCode::ClassNotFound, "班级不存在"));
    }

    let allowed = ctx.access.is_accepted_member(class_id, actor.id).await?
        || ctx.access.is_class_teacher(class_id, actor).await?;
    if !allowed {
        return Err(ServiceError::forbidden(
            ErrorCode::ClassPermissionDenied,
            "您不是该班级成员，无权查看测验列表",
        ));
    }

    let (page, size) = params.pagination.normalized();
    let query = QuizListQuery {
        page,
        size,
        class_id,
        search: params.search,
    };
    Ok(ctx.storage.list_quizzes_with_pagination(query).await?)
}

pub async fn list_class_quizzes(
    service: &QuizService,
    request: &HttpRequest,
    class_id: i64,
    params: QuizListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let ctx = match service.get_context(request) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };

    let result = list_class_quizzes_for(&ctx, &user, class_id, params).await;
    Ok(respond(result, StatusCode::OK, "查询成功"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::services::context::test_support::{classroom, open_fields, seed_quiz};
    use serde_json::json;

    fn params(search: Option<&str>) -> QuizListParams {
        QuizListParams {
            pagination: PaginationQuery { page: 1, size: 10 },
            search: search.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn members_list_and_search() {
        let room = classroom().await;
        let mut fields = open_fields();
        fields.title = "Algebra 100%".to_string();
        seed_quiz(&room, fields, json!([])).await;
        let mut fields = open_fields();
        fields.title = "Geometry".to_string();
        seed_quiz(&room, fields, json!([])).await;

        let all = list_class_quizzes_for(&room.ctx, &room.student, room.class_id, params(None))
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);
        assert_eq!(all.items.len(), 2);

        let found =
            list_class_quizzes_for(&room.ctx, &room.teacher, room.class_id, params(Some("100%")))
                .await
                .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].title, "Algebra 100%");
    }

    #[tokio::test]
    async fn outsider_cannot_list() {
        let room = classroom().await;
        let err = list_class_quizzes_for(&room.ctx, &room.outsider, room.class_id, params(None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ClassPermissionDenied);
    }
}
