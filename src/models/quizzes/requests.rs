use crate::models::common::pagination::PaginationQuery;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// 创建测验请求
///
/// `questions` 接受三种历史格式：`{ pages: [...] }`、页数组、扁平题目数组。
#[derive(Debug, Deserialize)]
pub struct CreateQuizRequest {
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub attempts_allowed: Option<i32>,
    pub start_time: Option<DateTime<Utc>>, // ISO 8601 格式
    pub end_time: Option<DateTime<Utc>>,
    pub time_limit_seconds: Option<i64>,
    #[serde(default)]
    pub questions: Value,
}

/// 更新测验请求（整体替换）
///
/// 策略字段未提供即清空；`questions` 缺省时保留原有页面。
#[derive(Debug, Deserialize)]
pub struct UpdateQuizRequest {
    pub title: String,
    pub description: Option<String>,
    pub attempts_allowed: Option<i32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub time_limit_seconds: Option<i64>,
    pub questions: Option<Value>,
}

/// 班级测验列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct QuizListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone)]
pub struct QuizListQuery {
    pub page: u64,
    pub size: u64,
    pub class_id: i64,
    pub search: Option<String>,
}

/// 存储层使用的测验字段
#[derive(Debug, Clone)]
pub struct QuizFields {
    pub title: String,
    pub description: Option<String>,
    pub attempts_allowed: Option<i32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub time_limit_seconds: Option<i64>,
}
