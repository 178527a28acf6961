use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::attempts;
use crate::middlewares;
use crate::models::quizzes::requests::{CreateQuizRequest, QuizListParams, UpdateQuizRequest};
use crate::services::QuizService;
use crate::utils::{SafeClassIdI64, SafeIDI64};

// 懒加载的全局 QuizService 实例
static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

// 创建测验
pub async fn create_quiz(
    req: HttpRequest,
    body: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.create_quiz(&req, body.into_inner()).await
}

// 列出班级测验
pub async fn list_class_quizzes(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<QuizListParams>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .list_class_quizzes(&req, class_id.0, query.into_inner())
        .await
}

// 获取测验详情
pub async fn get_quiz(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz(&req, path.0).await
}

// 整体更新测验
pub async fn update_quiz(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .update_quiz(&req, path.0, body.into_inner())
        .await
}

// 删除测验
pub async fn delete_quiz(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.delete_quiz(&req, path.0).await
}

// 配置路由
pub fn configure_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/quizzes")
            .wrap(middlewares::RequireJWT)
            // 创建测验 - 权限在业务层检查（班级教师）
            .service(web::resource("").route(web::post().to(create_quiz)))
            .service(
                web::resource("/{id}")
                    // 详情 - 所属教师看到答案，班级成员看到去除答案的内容
                    .route(web::get().to(get_quiz))
                    .route(web::put().to(update_quiz))
                    .route(web::delete().to(delete_quiz)),
            )
            .service(
                web::resource("/{id}/attempts")
                    // 开始作答 - 班级成员
                    .route(web::post().to(attempts::start_attempt))
                    // 全部作答 - 仅测验所属教师
                    .route(web::get().to(attempts::list_quiz_attempts)),
            )
            .service(
                web::resource("/{id}/attempts/my").route(web::get().to(attempts::list_my_attempts)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{class_id}/quizzes").route(web::get().to(list_class_quizzes)),
            ),
    );
}
