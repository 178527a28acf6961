use crate::models::common::pagination::PaginationInfo;
use crate::models::quizzes::entities::{Page, Quiz};
use serde::Serialize;

/// 去除答案后的页面
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactedPage {
    pub id: String,
    pub title: String,
    pub questions: Vec<RedactedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedQuestion {
    pub id: String,
    pub text: String,
    pub requires_manual_grading: bool,
    #[serde(flatten)]
    pub body: RedactedBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RedactedBody {
    MultipleChoice { options: Vec<String> },
    Checkboxes { options: Vec<String> },
    ShortAnswer { sentence_limit: u8 },
    Paragraph { sentence_limit: u8 },
}

/// 测验内容：所属教师看到完整页面，其余人看到去除答案的页面
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuizPages {
    Full(Vec<Page>),
    Redacted(Vec<RedactedPage>),
}

/// 测验详情
#[derive(Debug, Serialize)]
pub struct QuizDetailResponse {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub pages: QuizPages,
    // 是否为测验所属教师
    pub is_owner: bool,
    // 学生已用作答次数（教师视角为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_used: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct QuizListResponse {
    pub items: Vec<Quiz>,
    pub pagination: PaginationInfo,
}
