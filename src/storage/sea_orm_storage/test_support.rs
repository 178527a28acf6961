//! 测试辅助：内存 SQLite 存储与基础数据

use super::SeaOrmStorage;
use crate::entity::{class_users, classes, quiz_pages, users};
use crate::models::class_users::entities::ClassUserRole;
use crate::models::users::entities::UserRole;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};

/// 迁移完成的内存数据库（单连接，保证所有查询看到同一个库）
pub(crate) async fn memory_storage() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite memory");
    SeaOrmStorage::with_connection(db)
        .await
        .expect("run migrations")
}

pub(crate) async fn seed_user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> i64 {
    let now = chrono::Utc::now().timestamp();
    users::ActiveModel {
        username: Set(username.to_string()),
        role: Set(role.to_string()),
        status: Set("active".to_string()),
        display_name: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("insert user")
    .id
}

pub(crate) async fn seed_class(storage: &SeaOrmStorage, teacher_id: i64) -> i64 {
    classes::ActiveModel {
        teacher_id: Set(teacher_id),
        class_name: Set(format!("class-of-{teacher_id}")),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("insert class")
    .id
}

pub(crate) async fn seed_member(
    storage: &SeaOrmStorage,
    class_id: i64,
    user_id: i64,
    role: ClassUserRole,
) {
    class_users::ActiveModel {
        class_id: Set(class_id),
        user_id: Set(user_id),
        role: Set(role.to_string()),
        joined_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("insert class member");
}

/// 直接写入一条原始页面记录（可用于构造损坏的数据）
pub(crate) async fn insert_raw_page(
    storage: &SeaOrmStorage,
    quiz_id: i64,
    position: i32,
    questions: &str,
) {
    quiz_pages::ActiveModel {
        quiz_id: Set(quiz_id),
        page_uid: Set(format!("raw-{position}")),
        position: Set(position),
        title: Set(format!("Raw {position}")),
        questions: Set(questions.to_string()),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("insert raw page");
}
