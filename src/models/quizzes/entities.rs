use serde::{Deserialize, Serialize};

/// 测验
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    // 唯一 ID
    pub id: i64,
    // 所属班级 ID
    pub class_id: i64,
    // 创建者（教师）ID
    pub created_by: i64,
    // 测验标题
    pub title: String,
    // 测验说明
    pub description: Option<String>,
    // 允许作答次数，None 表示不限
    pub attempts_allowed: Option<i32>,
    // 开放时间
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    // 截止时间
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    // 单次作答时长（秒）
    pub time_limit_seconds: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 时间以秒存储，窗口比较同样按整秒进行
impl Quiz {
    pub fn is_not_yet_open_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.start_time.is_some_and(|start| now.timestamp() < start.timestamp())
    }

    pub fn is_closed_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.end_time.is_some_and(|end| now.timestamp() > end.timestamp())
    }
}

/// 测验页
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

/// 规范化后的题目
///
/// 题型相关字段放在 `body` 中，序列化时与公共字段平铺，`type` 作为标签。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub requires_manual_grading: bool,
    #[serde(flatten)]
    pub body: QuestionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum QuestionBody {
    MultipleChoice {
        options: Vec<String>,
        correct_answer: Option<usize>,
    },
    Checkboxes {
        options: Vec<String>,
        correct_answer: Vec<usize>,
    },
    ShortAnswer {
        correct_answer: String,
        sentence_limit: u8,
    },
    Paragraph {
        correct_answer: String,
        sentence_limit: u8,
    },
}

/// 标准答案的比较形态
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKey {
    Single(String),
    Set(Vec<String>),
}

impl QuestionBody {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionBody::MultipleChoice { .. } => "multiple_choice",
            QuestionBody::Checkboxes { .. } => "checkboxes",
            QuestionBody::ShortAnswer { .. } => "short_answer",
            QuestionBody::Paragraph { .. } => "paragraph",
        }
    }

    /// 标准答案；未设置（空值、空集合、空字符串）时返回 None
    pub fn answer_key(&self) -> Option<AnswerKey> {
        match self {
            QuestionBody::MultipleChoice { correct_answer, .. } => {
                correct_answer.map(|idx| AnswerKey::Single(idx.to_string()))
            }
            QuestionBody::Checkboxes { correct_answer, .. } => {
                if correct_answer.is_empty() {
                    None
                } else {
                    Some(AnswerKey::Set(
                        correct_answer.iter().map(|idx| idx.to_string()).collect(),
                    ))
                }
            }
            QuestionBody::ShortAnswer { correct_answer, .. }
            | QuestionBody::Paragraph { correct_answer, .. } => {
                if correct_answer.is_empty() {
                    None
                } else {
                    Some(AnswerKey::Single(correct_answer.clone()))
                }
            }
        }
    }
}
