//! 通知协作者
//!
//! 发送即忘：通知失败只记录日志，不影响触发它的评分或批改结果。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::notifications::entities::NotificationRequest;
use crate::storage::Storage;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, req: NotificationRequest);
}

/// 写入通知表的实现
pub struct StorageNotifier {
    storage: Arc<dyn Storage>,
}

impl StorageNotifier {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Notifier for StorageNotifier {
    async fn notify(&self, req: NotificationRequest) {
        let recipient_id = req.recipient_id;
        let notification_type = req.notification_type;
        match self.storage.create_notification(req).await {
            Ok(notification) => debug!(
                "Notification {} ({}) sent to user {}",
                notification.id, notification_type, recipient_id
            ),
            Err(e) => warn!(
                "Failed to send {} notification to user {}: {}",
                notification_type, recipient_id, e
            ),
        }
    }
}
