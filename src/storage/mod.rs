use std::sync::Arc;

use crate::models::{
    attempts::{
        entities::{AttemptGrade, AttemptSubmission, NewAttempt, QuizAttempt},
        requests::AttemptListQuery,
        responses::AttemptListResponse,
    },
    class_users::entities::ClassUser,
    classes::entities::Class,
    notifications::entities::{Notification, NotificationRequest},
    quizzes::{
        entities::{Page, Quiz},
        requests::{QuizFields, QuizListQuery},
        responses::QuizListResponse,
    },
    users::entities::User,
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户（只读）
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 班级（只读）
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 获取用户在班级中的信息
    async fn get_class_user_by_user_id_and_class_id(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>>;

    /// 测验管理方法
    // 创建测验及其页面（同一事务）
    async fn create_quiz(
        &self,
        class_id: i64,
        created_by: i64,
        fields: QuizFields,
        pages: Vec<Page>,
    ) -> Result<Quiz>;
    // 通过ID获取测验
    async fn get_quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>>;
    // 分页列出班级测验
    async fn list_quizzes_with_pagination(&self, query: QuizListQuery)
    -> Result<QuizListResponse>;
    // 整体更新测验，pages 为 Some 时同时替换全部页面
    async fn update_quiz(
        &self,
        quiz_id: i64,
        fields: QuizFields,
        pages: Option<Vec<Page>>,
    ) -> Result<Option<Quiz>>;
    // 删除测验（级联删除页面与作答）
    async fn delete_quiz(&self, quiz_id: i64) -> Result<bool>;

    /// 测验页方法
    // 按页序加载测验页面
    async fn load_pages(&self, quiz_id: i64) -> Result<Vec<Page>>;

    /// 作答管理方法
    // 统计学生在测验下的作答次数
    async fn count_attempts(&self, quiz_id: i64, student_id: i64) -> Result<i64>;
    // 创建作答，序号冲突时返回 UniqueViolation
    async fn create_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt>;
    // 通过ID获取作答
    async fn get_attempt_by_id(&self, attempt_id: i64) -> Result<Option<QuizAttempt>>;
    // 列出学生在测验下的全部作答
    async fn list_student_attempts(&self, quiz_id: i64, student_id: i64)
    -> Result<Vec<QuizAttempt>>;
    // 分页列出测验的作答
    async fn list_attempts_with_pagination(
        &self,
        query: AttemptListQuery,
    ) -> Result<AttemptListResponse>;
    // 将作答中的记录标记为超时
    async fn mark_attempt_expired(&self, attempt_id: i64) -> Result<bool>;
    // 提交作答，仅当状态仍为 in_progress 时生效
    async fn submit_attempt(&self, attempt_id: i64, submission: AttemptSubmission)
    -> Result<bool>;
    // 教师批改（覆盖得分）
    async fn grade_attempt(&self, attempt_id: i64, grade: AttemptGrade)
    -> Result<Option<QuizAttempt>>;

    /// 通知方法
    // 创建通知
    async fn create_notification(&self, req: NotificationRequest) -> Result<Notification>;
    // 列出用户的通知
    async fn list_user_notifications(&self, user_id: i64) -> Result<Vec<Notification>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
