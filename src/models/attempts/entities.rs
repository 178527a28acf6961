use serde::{Deserialize, Serialize};
use serde_json::Value;

// 作答状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,   // 作答中
    Completed,    // 已完成
    Expired,      // 已超时
    NeedsGrading, // 待人工批改
}

impl AttemptStatus {
    pub const IN_PROGRESS: &'static str = "in_progress";
    pub const COMPLETED: &'static str = "completed";
    pub const EXPIRED: &'static str = "expired";
    pub const NEEDS_GRADING: &'static str = "needs_grading";

    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => Self::IN_PROGRESS,
            AttemptStatus::Completed => Self::COMPLETED,
            AttemptStatus::Expired => Self::EXPIRED,
            AttemptStatus::NeedsGrading => Self::NEEDS_GRADING,
        }
    }

    /// 已提交（等待或完成评分）
    pub fn is_submitted(&self) -> bool {
        matches!(self, AttemptStatus::Completed | AttemptStatus::NeedsGrading)
    }
}

impl<'de> Deserialize<'de> for AttemptStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作答状态: '{s}'. 支持的状态: in_progress, completed, expired, needs_grading"
            ))
        })
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AttemptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AttemptStatus::IN_PROGRESS => Ok(AttemptStatus::InProgress),
            AttemptStatus::COMPLETED => Ok(AttemptStatus::Completed),
            AttemptStatus::EXPIRED => Ok(AttemptStatus::Expired),
            AttemptStatus::NEEDS_GRADING => Ok(AttemptStatus::NeedsGrading),
            _ => Err(format!("Invalid attempt status: {s}")),
        }
    }
}

/// 学生的一次作答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    // 第几次作答，从 1 开始
    pub attempt_no: i32,
    pub status: AttemptStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    // 百分制得分，待批改时为 None
    pub score: Option<f64>,
    // 题目 ID -> 学生答案
    pub answers: Value,
    // 题目 ID -> 评分明细
    pub grading: Value,
    pub grader_id: Option<i64>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub comment: Option<String>,
}

impl QuizAttempt {
    /// 截止时间以秒存储，按整秒比较
    pub fn is_expired_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now.timestamp() > expires.timestamp())
    }
}

/// 单题评分明细
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum GradingEntry {
    // 需人工批改，不计入自动评分
    Manual {
        requires_manual_grading: bool,
        answer: Value,
        scored: bool,
    },
    Scored {
        correct: bool,
        given: Value,
        expected: Value,
        scored: bool,
    },
}

/// 新建作答所需字段
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_no: i32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 提交结果
#[derive(Debug, Clone)]
pub struct AttemptSubmission {
    pub status: AttemptStatus,
    pub score: Option<f64>,
    pub answers: Value,
    pub grading: Value,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// 教师批改结果
#[derive(Debug, Clone)]
pub struct AttemptGrade {
    pub score: f64,
    pub grading: Option<Value>,
    pub comment: Option<String>,
    pub grader_id: i64,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AttemptStatus::InProgress,
            AttemptStatus::Completed,
            AttemptStatus::Expired,
            AttemptStatus::NeedsGrading,
        ] {
            assert_eq!(status.as_str().parse::<AttemptStatus>(), Ok(status));
        }
        assert!("graded".parse::<AttemptStatus>().is_err());
    }

    #[test]
    fn expiry_ignores_sub_second_remainder() {
        let expires = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let attempt = QuizAttempt {
            id: 1,
            quiz_id: 1,
            student_id: 1,
            attempt_no: 1,
            status: AttemptStatus::InProgress,
            started_at: expires - chrono::Duration::seconds(60),
            expires_at: Some(expires),
            submitted_at: None,
            score: None,
            answers: json!({}),
            grading: json!({}),
            grader_id: None,
            graded_at: None,
            comment: None,
        };
        assert!(!attempt.is_expired_at(expires + chrono::Duration::milliseconds(999)));
        assert!(attempt.is_expired_at(expires + chrono::Duration::seconds(1)));
    }

    #[test]
    fn grading_entries_use_camel_case() {
        let manual = GradingEntry::Manual {
            requires_manual_grading: true,
            answer: json!("essay"),
            scored: false,
        };
        assert_eq!(
            serde_json::to_value(&manual).unwrap(),
            json!({"requiresManualGrading": true, "answer": "essay", "scored": false})
        );
        let scored = GradingEntry::Scored {
            correct: true,
            given: json!("1"),
            expected: json!(1),
            scored: true,
        };
        assert_eq!(
            serde_json::to_value(&scored).unwrap(),
            json!({"correct": true, "given": "1", "expected": 1, "scored": true})
        );
    }
}
