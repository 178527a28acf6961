//! 班级成员存储操作

use super::SeaOrmStorage;
use crate::entity::class_users::{Column, Entity as ClassUsers};
use crate::errors::{QuizSystemError, Result};
use crate::models::class_users::entities::ClassUser;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

impl SeaOrmStorage {
    /// 获取用户在班级中的成员信息
    pub async fn get_class_user_by_user_id_and_class_id_impl(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>> {
        let result = ClassUsers::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ClassId.eq(class_id))
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_user()))
    }
}
