//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{QuizSystemError, Result};
use crate::models::notifications::entities::{Notification, NotificationRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建通知
    pub async fn create_notification_impl(
        &self,
        req: NotificationRequest,
    ) -> Result<Notification> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            recipient_id: Set(req.recipient_id),
            sender_id: Set(req.sender_id),
            notification_type: Set(req.notification_type.to_string()),
            message: Set(req.message),
            link: Set(req.link),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("创建通知失败: {e}")))?;

        Ok(result.into_notification())
    }

    /// 列出用户的通知（最新在前）
    pub async fn list_user_notifications_impl(&self, user_id: i64) -> Result<Vec<Notification>> {
        let result = Notifications::find()
            .filter(Column::RecipientId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_notification()).collect())
    }
}
