//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attempts;
mod class_users;
mod classes;
mod notifications;
mod pages;
mod quizzes;
mod users;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::AppConfig;
use crate::errors::{QuizSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::with_connection(db).await?;
        info!("SeaORM storage initialized, database: {}", db_url);

        Ok(storage)
    }

    /// 使用已有连接创建存储实例并运行迁移
    pub async fn with_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| QuizSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| QuizSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| QuizSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(QuizSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 班级模块
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_user_by_user_id_and_class_id(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>> {
        self.get_class_user_by_user_id_and_class_id_impl(user_id, class_id)
            .await
    }

    // 测验模块
    async fn create_quiz(
        &self,
        class_id: i64,
        created_by: i64,
        fields: QuizFields,
        pages: Vec<Page>,
    ) -> Result<Quiz> {
        self.create_quiz_impl(class_id, created_by, fields, pages)
            .await
    }

    async fn get_quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(quiz_id).await
    }

    async fn list_quizzes_with_pagination(
        &self,
        query: QuizListQuery,
    ) -> Result<QuizListResponse> {
        self.list_quizzes_with_pagination_impl(query).await
    }

    async fn update_quiz(
        &self,
        quiz_id: i64,
        fields: QuizFields,
        pages: Option<Vec<Page>>,
    ) -> Result<Option<Quiz>> {
        self.update_quiz_impl(quiz_id, fields, pages).await
    }

    async fn delete_quiz(&self, quiz_id: i64) -> Result<bool> {
        self.delete_quiz_impl(quiz_id).await
    }

    // 测验页模块
    async fn load_pages(&self, quiz_id: i64) -> Result<Vec<Page>> {
        self.load_pages_impl(quiz_id).await
    }

    // 作答模块
    async fn count_attempts(&self, quiz_id: i64, student_id: i64) -> Result<i64> {
        self.count_attempts_impl(quiz_id, student_id).await
    }

    async fn create_attempt(&self, attempt: NewAttempt) -> Result<QuizAttempt> {
        self.create_attempt_impl(attempt).await
    }

    async fn get_attempt_by_id(&self, attempt_id: i64) -> Result<Option<QuizAttempt>> {
        self.get_attempt_by_id_impl(attempt_id).await
    }

    async fn list_student_attempts(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Vec<QuizAttempt>> {
        self.list_student_attempts_impl(quiz_id, student_id).await
    }

    async fn list_attempts_with_pagination(
        &self,
        query: AttemptListQuery,
    ) -> Result<AttemptListResponse> {
        self.list_attempts_with_pagination_impl(query).await
    }

    async fn mark_attempt_expired(&self, attempt_id: i64) -> Result<bool> {
        self.mark_attempt_expired_impl(attempt_id).await
    }

    async fn submit_attempt(
        &self,
        attempt_id: i64,
        submission: AttemptSubmission,
    ) -> Result<bool> {
        self.submit_attempt_impl(attempt_id, submission).await
    }

    async fn grade_attempt(
        &self,
        attempt_id: i64,
        grade: AttemptGrade,
    ) -> Result<Option<QuizAttempt>> {
        self.grade_attempt_impl(attempt_id, grade).await
    }

    // 通知模块
    async fn create_notification(&self, req: NotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn list_user_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.list_user_notifications_impl(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_database_url_from_path() {
        assert_eq!(
            SeaOrmStorage::build_database_url("quizsystem.db").unwrap(),
            "sqlite://quizsystem.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://localhost/quiz").unwrap(),
            "postgres://localhost/quiz"
        );
        assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
    }
}
