use serde::{Deserialize, Serialize};

// 通知类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    QuizSubmitted,
    QuizNeedsGrading,
    QuizGraded,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::QuizSubmitted => "quiz_submitted",
            NotificationType::QuizNeedsGrading => "quiz_needs_grading",
            NotificationType::QuizGraded => "quiz_graded",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 待发送的通知
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    pub notification_type: NotificationType,
    pub message: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    pub notification_type: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
