use crate::models::attempts::entities::AttemptStatus;
use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use serde_json::Value;

/// 提交作答请求
///
/// `answers` 可以是对象，也可以是内容为 JSON 对象的字符串。
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: Value,
}

/// 教师批改请求
#[derive(Debug, Deserialize)]
pub struct GradeAttemptRequest {
    // 非数字时按 0 处理
    #[serde(default)]
    pub score: Value,
    pub grading: Option<Value>,
    pub comment: Option<String>,
}

/// 作答列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<AttemptStatus>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone)]
pub struct AttemptListQuery {
    pub page: u64,
    pub size: u64,
    pub quiz_id: i64,
    pub status: Option<AttemptStatus>,
}
