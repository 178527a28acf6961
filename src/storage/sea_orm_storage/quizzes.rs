//! 测验存储操作

use super::SeaOrmStorage;
use super::pages::replace_pages;
use crate::entity::quiz_attempts::{Column as AttemptColumn, Entity as QuizAttempts};
use crate::entity::quiz_pages::{Column as PageColumn, Entity as QuizPages};
use crate::entity::quizzes::{ActiveModel, Column, Entity as Quizzes};
use crate::errors::{QuizSystemError, Result};
use crate::models::{
    PaginationInfo,
    quizzes::{
        entities::{Page, Quiz},
        requests::{QuizFields, QuizListQuery},
        responses::QuizListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建测验并写入页面（单事务）
    pub async fn create_quiz_impl(
        &self,
        class_id: i64,
        created_by: i64,
        fields: QuizFields,
        pages: Vec<Page>,
    ) -> Result<Quiz> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            class_id: Set(class_id),
            created_by: Set(created_by),
            title: Set(fields.title),
            description: Set(fields.description),
            attempts_allowed: Set(fields.attempts_allowed),
            start_time: Set(fields.start_time.map(|dt| dt.timestamp())),
            end_time: Set(fields.end_time.map(|dt| dt.timestamp())),
            time_limit_seconds: Set(fields.time_limit_seconds),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("创建测验失败: {e}")))?;

        replace_pages(&txn, result.id, &pages).await?;

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.into_quiz())
    }

    /// 通过 ID 获取测验
    pub async fn get_quiz_by_id_impl(&self, quiz_id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(quiz_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    /// 分页列出班级测验
    pub async fn list_quizzes_with_pagination_impl(
        &self,
        query: QuizListQuery,
    ) -> Result<QuizListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Quizzes::find().filter(Column::ClassId.eq(query.class_id));

        // 搜索条件（按标题搜索）
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Column::Title.like(LikeExpr::new(format!("%{escaped}%")).escape('\\')),
            );
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_quiz())
            .collect();

        Ok(QuizListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 整体更新测验字段，pages 为 Some 时在同一事务内替换页面
    pub async fn update_quiz_impl(
        &self,
        quiz_id: i64,
        fields: QuizFields,
        pages: Option<Vec<Page>>,
    ) -> Result<Option<Quiz>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = Quizzes::find_by_id(quiz_id)
            .one(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.title = Set(fields.title);
        model.description = Set(fields.description);
        model.attempts_allowed = Set(fields.attempts_allowed);
        model.start_time = Set(fields.start_time.map(|dt| dt.timestamp()));
        model.end_time = Set(fields.end_time.map(|dt| dt.timestamp()));
        model.time_limit_seconds = Set(fields.time_limit_seconds);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("更新测验失败: {e}")))?;

        if let Some(pages) = pages {
            replace_pages(&txn, quiz_id, &pages).await?;
        }

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(updated.into_quiz()))
    }

    /// 删除测验及其页面、作答（单事务）
    pub async fn delete_quiz_impl(&self, quiz_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        QuizAttempts::delete_many()
            .filter(AttemptColumn::QuizId.eq(quiz_id))
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("删除测验作答失败: {e}")))?;

        QuizPages::delete_many()
            .filter(PageColumn::QuizId.eq(quiz_id))
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("删除测验页失败: {e}")))?;

        let result = Quizzes::delete_by_id(quiz_id)
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("删除测验失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
