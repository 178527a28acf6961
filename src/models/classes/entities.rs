use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    // 班级ID
    pub id: i64,
    // 班级名称
    pub class_name: String,
    // 教师ID
    pub teacher_id: i64,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}
