//! 测验页存储操作
//!
//! 页面只做整体替换：先删除测验的全部页面，再按顺序重新插入。

use super::SeaOrmStorage;
use crate::entity::quiz_pages::{ActiveModel, Column, Entity as QuizPages};
use crate::errors::{QuizSystemError, Result};
use crate::models::quizzes::entities::{Page, Question};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::warn;

/// 在给定连接（通常是事务）上替换测验的全部页面
///
/// 创建与更新测验时在同一事务内调用，页面与测验字段一起提交或回滚。
pub(super) async fn replace_pages<C>(conn: &C, quiz_id: i64, pages: &[Page]) -> Result<()>
where
    C: ConnectionTrait,
{
    QuizPages::delete_many()
        .filter(Column::QuizId.eq(quiz_id))
        .exec(conn)
        .await
        .map_err(|e| QuizSystemError::database_operation(format!("删除测验页失败: {e}")))?;

    for (position, page) in pages.iter().enumerate() {
        let questions = serde_json::to_string(&page.questions)?;

        let model = ActiveModel {
            quiz_id: Set(quiz_id),
            page_uid: Set(page.id.clone()),
            position: Set(position as i32),
            title: Set(page.title.clone()),
            questions: Set(questions),
            ..Default::default()
        };

        model
            .insert(conn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("写入测验页失败: {e}")))?;
    }

    Ok(())
}

impl SeaOrmStorage {
    /// 按页序加载测验页面
    ///
    /// 某一页的题目数据无法解析时记录警告，并以空题目列表代替，其余页面不受影响。
    pub async fn load_pages_impl(&self, quiz_id: i64) -> Result<Vec<Page>> {
        let rows = QuizPages::find()
            .filter(Column::QuizId.eq(quiz_id))
            .order_by_asc(Column::Position)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验页失败: {e}")))?;

        let pages = rows
            .into_iter()
            .map(|row| {
                let questions = serde_json::from_str::<Vec<Question>>(&row.questions)
                    .unwrap_or_else(|e| {
                        warn!(
                            "Malformed questions payload for quiz {} page {} ({}): {}",
                            quiz_id, row.position, row.page_uid, e
                        );
                        Vec::new()
                    });

                Page {
                    id: row.page_uid,
                    title: row.title,
                    questions,
                }
            })
            .collect();

        Ok(pages)
    }
}
