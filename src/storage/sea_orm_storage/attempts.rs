//! 作答存储操作

use super::SeaOrmStorage;
use crate::entity::quiz_attempts::{ActiveModel, Column, Entity as QuizAttempts};
use crate::errors::{QuizSystemError, Result};
use crate::models::{
    PaginationInfo,
    attempts::{
        entities::{AttemptGrade, AttemptStatus, AttemptSubmission, NewAttempt, QuizAttempt},
        requests::AttemptListQuery,
        responses::AttemptListResponse,
    },
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 统计学生在测验下的作答次数
    pub async fn count_attempts_impl(&self, quiz_id: i64, student_id: i64) -> Result<i64> {
        let count = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .filter(Column::StudentId.eq(student_id))
            .count(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("统计作答次数失败: {e}")))?;

        Ok(count as i64)
    }

    /// 创建作答
    ///
    /// (quiz_id, student_id, attempt_no) 唯一，冲突时返回 `UniqueViolation` 供上层重试。
    pub async fn create_attempt_impl(&self, attempt: NewAttempt) -> Result<QuizAttempt> {
        let model = ActiveModel {
            quiz_id: Set(attempt.quiz_id),
            student_id: Set(attempt.student_id),
            attempt_no: Set(attempt.attempt_no),
            status: Set(AttemptStatus::InProgress.to_string()),
            started_at: Set(attempt.started_at.timestamp()),
            expires_at: Set(attempt.expires_at.map(|dt| dt.timestamp())),
            submitted_at: Set(None),
            score: Set(None),
            answers: Set("{}".to_string()),
            grading: Set("{}".to_string()),
            grader_id: Set(None),
            graded_at: Set(None),
            comment: Set(None),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            let err = QuizSystemError::from(e);
            if err.is_unique_violation() {
                err
            } else {
                QuizSystemError::database_operation(format!("创建作答失败: {}", err.message()))
            }
        })?;

        Ok(result.into_attempt())
    }

    /// 通过 ID 获取作答
    pub async fn get_attempt_by_id_impl(&self, attempt_id: i64) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find_by_id(attempt_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答失败: {e}")))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    /// 列出学生在测验下的全部作答（按序号升序）
    pub async fn list_student_attempts_impl(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Vec<QuizAttempt>> {
        let result = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::AttemptNo)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_attempt()).collect())
    }

    /// 分页列出测验的作答
    pub async fn list_attempts_with_pagination_impl(
        &self,
        query: AttemptListQuery,
    ) -> Result<AttemptListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = QuizAttempts::find().filter(Column::QuizId.eq(query.quiz_id));

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        select = select
            .order_by_desc(Column::StartedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_attempt())
            .collect();

        Ok(AttemptListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 将仍在作答中的记录标记为超时
    pub async fn mark_attempt_expired_impl(&self, attempt_id: i64) -> Result<bool> {
        let result = QuizAttempts::update_many()
            .col_expr(Column::Status, Expr::value(AttemptStatus::EXPIRED))
            .filter(Column::Id.eq(attempt_id))
            .filter(Column::Status.eq(AttemptStatus::IN_PROGRESS))
            .exec(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("更新作答状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 提交作答
    ///
    /// 条件更新：只有状态仍为 in_progress 的记录会被写入，返回是否写入成功。
    pub async fn submit_attempt_impl(
        &self,
        attempt_id: i64,
        submission: AttemptSubmission,
    ) -> Result<bool> {
        let answers = serde_json::to_string(&submission.answers)?;
        let grading = serde_json::to_string(&submission.grading)?;

        let result = QuizAttempts::update_many()
            .col_expr(Column::Status, Expr::value(submission.status.as_str()))
            .col_expr(Column::Score, Expr::value(submission.score))
            .col_expr(Column::Answers, Expr::value(answers))
            .col_expr(Column::Grading, Expr::value(grading))
            .col_expr(
                Column::SubmittedAt,
                Expr::value(submission.submitted_at.timestamp()),
            )
            .filter(Column::Id.eq(attempt_id))
            .filter(Column::Status.eq(AttemptStatus::IN_PROGRESS))
            .exec(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交作答失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 教师批改：覆盖得分并将状态置为 completed
    ///
    /// 得分、评分明细与评语整体覆盖，未提供的字段写为空。
    pub async fn grade_attempt_impl(
        &self,
        attempt_id: i64,
        grade: AttemptGrade,
    ) -> Result<Option<QuizAttempt>> {
        let existing = QuizAttempts::find_by_id(attempt_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.status = Set(AttemptStatus::Completed.to_string());
        model.score = Set(Some(grade.score));
        model.grading = Set(serde_json::to_string(
            &grade.grading.unwrap_or(serde_json::Value::Null),
        )?);
        model.comment = Set(grade.comment);
        model.grader_id = Set(Some(grade.grader_id));
        model.graded_at = Set(Some(grade.graded_at.timestamp()));

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("批改作答失败: {e}")))?;

        Ok(Some(updated.into_attempt()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_class, seed_user};
    use crate::models::attempts::entities::{AttemptStatus, AttemptSubmission, NewAttempt};
    use crate::models::quizzes::requests::QuizFields;
    use crate::models::users::entities::UserRole;
    use serde_json::json;

    async fn setup() -> (super::SeaOrmStorage, i64, i64) {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher", UserRole::Teacher).await;
        let student = seed_user(&storage, "student", UserRole::User).await;
        let class_id = seed_class(&storage, teacher).await;
        let quiz = storage
            .create_quiz_impl(
                class_id,
                teacher,
                QuizFields {
                    title: "Quiz".to_string(),
                    description: None,
                    attempts_allowed: Some(2),
                    start_time: None,
                    end_time: None,
                    time_limit_seconds: None,
                },
                vec![],
            )
            .await
            .unwrap();
        (storage, quiz.id, student)
    }

    fn new_attempt(quiz_id: i64, student_id: i64, attempt_no: i32) -> NewAttempt {
        NewAttempt {
            quiz_id,
            student_id,
            attempt_no,
            started_at: chrono::Utc::now(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_attempt_number_is_unique_violation() {
        let (storage, quiz_id, student) = setup().await;
        storage
            .create_attempt_impl(new_attempt(quiz_id, student, 1))
            .await
            .unwrap();

        let err = storage
            .create_attempt_impl(new_attempt(quiz_id, student, 1))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(
            storage.count_attempts_impl(quiz_id, student).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn submit_only_applies_once() {
        let (storage, quiz_id, student) = setup().await;
        let attempt = storage
            .create_attempt_impl(new_attempt(quiz_id, student, 1))
            .await
            .unwrap();
        assert_eq!(attempt.status, AttemptStatus::InProgress);

        let submission = AttemptSubmission {
            status: AttemptStatus::Completed,
            score: Some(100.0),
            answers: json!({"q1": "1"}),
            grading: json!({}),
            submitted_at: chrono::Utc::now(),
        };
        assert!(
            storage
                .submit_attempt_impl(attempt.id, submission.clone())
                .await
                .unwrap()
        );

        let second = AttemptSubmission {
            score: Some(0.0),
            answers: json!({"q1": "0"}),
            ..submission
        };
        assert!(
            !storage
                .submit_attempt_impl(attempt.id, second)
                .await
                .unwrap()
        );

        let stored = storage
            .get_attempt_by_id_impl(attempt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AttemptStatus::Completed);
        assert_eq!(stored.score, Some(100.0));
        assert_eq!(stored.answers, json!({"q1": "1"}));
        assert!(
            !storage
                .mark_attempt_expired_impl(attempt.id)
                .await
                .unwrap()
        );
    }
}
