use std::sync::Arc;

use crate::config::QuizConfig;
use crate::models::notifications::entities::NotificationRequest;
use crate::services::access::{ClassroomAccess, StorageClassroomAccess};
use crate::services::notify::{Notifier, StorageNotifier};
use crate::storage::Storage;

/// 测验引擎运行所需的协作者
#[derive(Clone)]
pub struct EngineContext {
    pub storage: Arc<dyn Storage>,
    pub access: Arc<dyn ClassroomAccess>,
    pub notifier: Arc<dyn Notifier>,
    pub config: QuizConfig,
}

impl EngineContext {
    /// 使用基于存储的权限与通知实现
    pub fn from_storage(storage: Arc<dyn Storage>, config: QuizConfig) -> Self {
        Self {
            access: Arc::new(StorageClassroomAccess::new(storage.clone())),
            notifier: Arc::new(StorageNotifier::new(storage.clone())),
            storage,
            config,
        }
    }

    /// 按配置决定是否发送通知
    pub async fn notify(&self, req: NotificationRequest) {
        if self.config.notifications_enabled {
            self.notifier.notify(req).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::class_users::entities::ClassUserRole;
    use crate::models::quizzes::entities::Quiz;
    use crate::models::quizzes::requests::QuizFields;
    use crate::models::users::entities::{User, UserRole};
    use crate::services::quizzes::normalize_to_pages;
    use crate::services::quizzes::sanitize::tests::SequentialIds;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, seed_class, seed_member, seed_user,
    };
    use serde_json::Value;

    /// 一个班级：创建者教师、一名学生、一名未加入班级的用户
    pub(crate) struct Classroom {
        pub(crate) ctx: EngineContext,
        pub(crate) storage: SeaOrmStorage,
        pub(crate) class_id: i64,
        pub(crate) teacher: User,
        pub(crate) student: User,
        pub(crate) outsider: User,
    }

    async fn load_user(storage: &SeaOrmStorage, id: i64) -> User {
        storage
            .get_user_by_id(id)
            .await
            .expect("load user")
            .expect("user exists")
    }

    pub(crate) async fn classroom() -> Classroom {
        let storage = memory_storage().await;
        let teacher_id = seed_user(&storage, "teacher", UserRole::Teacher).await;
        let student_id = seed_user(&storage, "student", UserRole::User).await;
        let outsider_id = seed_user(&storage, "outsider", UserRole::User).await;
        let class_id = seed_class(&storage, teacher_id).await;
        seed_member(&storage, class_id, student_id, ClassUserRole::Student).await;

        let ctx = EngineContext::from_storage(Arc::new(storage.clone()), QuizConfig::default());
        Classroom {
            ctx,
            class_id,
            teacher: load_user(&storage, teacher_id).await,
            student: load_user(&storage, student_id).await,
            outsider: load_user(&storage, outsider_id).await,
            storage,
        }
    }

    /// 直接通过存储创建测验（绕过权限检查）
    pub(crate) async fn seed_quiz(
        room: &Classroom,
        fields: QuizFields,
        questions: Value,
    ) -> Quiz {
        let pages = normalize_to_pages(&questions, &mut SequentialIds::default());
        room.ctx
            .storage
            .create_quiz(room.class_id, room.teacher.id, fields, pages)
            .await
            .expect("create quiz")
    }

    pub(crate) fn open_fields() -> QuizFields {
        QuizFields {
            title: "Quiz".to_string(),
            description: None,
            attempts_allowed: None,
            start_time: None,
            end_time: None,
            time_limit_seconds: None,
        }
    }
}
