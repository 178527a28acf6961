use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attempts::requests::{
    AttemptListParams, GradeAttemptRequest, SubmitAttemptRequest,
};
use crate::services::AttemptService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AttemptService 实例
static ATTEMPT_SERVICE: Lazy<AttemptService> = Lazy::new(AttemptService::new_lazy);

// 开始作答
pub async fn start_attempt(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE.start_attempt(&req, path.0).await
}

// 我的作答记录
pub async fn list_my_attempts(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE.list_my_attempts(&req, path.0).await
}

// 测验的全部作答（教师）
pub async fn list_quiz_attempts(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<AttemptListParams>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .list_quiz_attempts(&req, path.0, query.into_inner())
        .await
}

// 作答详情
pub async fn get_attempt(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE.get_attempt(&req, path.0).await
}

// 提交作答
pub async fn submit_attempt(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmitAttemptRequest>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .submit_attempt(&req, path.0, body.into_inner())
        .await
}

// 教师批改
pub async fn grade_attempt(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<GradeAttemptRequest>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .grade_attempt(&req, path.0, body.into_inner())
        .await
}

// 配置路由
//
// 按测验列出与开始作答的接口挂在 /api/v1/quizzes/{id}/attempts 下，见 quizzes.rs
pub fn configure_attempt_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attempts")
            .wrap(middlewares::RequireJWT)
            // 详情 - 作答学生本人或测验所属教师
            .service(web::resource("/{id}").route(web::get().to(get_attempt)))
            // 提交 - 仅作答学生本人
            .service(web::resource("/{id}/submit").route(web::post().to(submit_attempt)))
            // 批改 - 仅测验所属教师
            .service(web::resource("/{id}/grade").route(web::put().to(grade_attempt))),
    );
}
