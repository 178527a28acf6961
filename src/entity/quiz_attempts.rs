//! 测验作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_no: i32,
    pub status: String,
    pub started_at: i64,
    pub expires_at: Option<i64>,
    pub submitted_at: Option<i64>,
    pub score: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub answers: String,
    #[sea_orm(column_type = "Text")]
    pub grading: String,
    pub grader_id: Option<i64>,
    pub graded_at: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_attempt(self) -> crate::models::attempts::entities::QuizAttempt {
        use crate::models::attempts::entities::{AttemptStatus, QuizAttempt};
        use chrono::{DateTime, Utc};

        QuizAttempt {
            id: self.id,
            quiz_id: self.quiz_id,
            student_id: self.student_id,
            attempt_no: self.attempt_no,
            status: self
                .status
                .parse::<AttemptStatus>()
                .unwrap_or(AttemptStatus::InProgress),
            started_at: DateTime::<Utc>::from_timestamp(self.started_at, 0).unwrap_or_default(),
            expires_at: self
                .expires_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            submitted_at: self
                .submitted_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            score: self.score,
            answers: parse_json_or_empty(&self.answers),
            grading: parse_json_or_empty(&self.grading),
            grader_id: self.grader_id,
            graded_at: self
                .graded_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            comment: self.comment,
        }
    }
}

fn parse_json_or_empty(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
}
