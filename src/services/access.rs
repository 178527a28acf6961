//! 班级权限协作者
//!
//! 测验引擎在任何写操作或暴露答案之前通过它判断教师归属与班级成员资格。

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::class_users::entities::ClassUserRole;
use crate::models::quizzes::entities::Quiz;
use crate::models::users::entities::User;
use crate::storage::Storage;

#[async_trait]
pub trait ClassroomAccess: Send + Sync {
    /// 用户是否可以管理该班级的测验（管理员、班级创建者或班级内的教师成员）
    async fn is_class_teacher(&self, class_id: i64, user: &User) -> Result<bool>;

    /// 用户是否为测验所属教师
    async fn is_teacher_owner_of(&self, quiz: &Quiz, user: &User) -> Result<bool> {
        if quiz.created_by == user.id {
            return Ok(true);
        }
        self.is_class_teacher(quiz.class_id, user).await
    }

    /// 用户是否已加入班级
    async fn is_accepted_member(&self, class_id: i64, user_id: i64) -> Result<bool>;
}

/// 基于存储的实现
pub struct StorageClassroomAccess {
    storage: Arc<dyn Storage>,
}

impl StorageClassroomAccess {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ClassroomAccess for StorageClassroomAccess {
    async fn is_class_teacher(&self, class_id: i64, user: &User) -> Result<bool> {
        if user.is_admin() {
            return Ok(true);
        }

        if let Some(class) = self.storage.get_class_by_id(class_id).await?
            && class.teacher_id == user.id
        {
            return Ok(true);
        }

        let membership = self
            .storage
            .get_class_user_by_user_id_and_class_id(user.id, class_id)
            .await?;
        Ok(membership.is_some_and(|m| m.role == ClassUserRole::Teacher))
    }

    async fn is_accepted_member(&self, class_id: i64, user_id: i64) -> Result<bool> {
        Ok(self
            .storage
            .get_class_user_by_user_id_and_class_id(user_id, class_id)
            .await?
            .is_some())
    }
}
