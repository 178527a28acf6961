//! 测验实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub created_by: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub attempts_allowed: Option<i32>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub time_limit_seconds: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::quiz_pages::Entity")]
    Pages,
    #[sea_orm(has_many = "super::quiz_attempts::Entity")]
    Attempts,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::quiz_pages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pages.def()
    }
}

impl Related<super::quiz_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_quiz(self) -> crate::models::quizzes::entities::Quiz {
        use crate::models::quizzes::entities::Quiz;
        use chrono::{DateTime, Utc};

        Quiz {
            id: self.id,
            class_id: self.class_id,
            created_by: self.created_by,
            title: self.title,
            description: self.description,
            attempts_allowed: self.attempts_allowed,
            start_time: self
                .start_time
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            end_time: self
                .end_time
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            time_limit_seconds: self.time_limit_seconds,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
