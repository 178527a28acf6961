use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表（由认证服务维护，这里只读）
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建班级表
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Classes::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Classes::ClassName).string().not_null())
                    .col(ColumnDef::new(Classes::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Classes::Table, Classes::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建班级用户关联表
        manager
            .create_table(
                Table::create()
                    .table(ClassUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassUsers::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(ClassUsers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ClassUsers::Role).string().not_null())
                    .col(
                        ColumnDef::new(ClassUsers::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassUsers::Table, ClassUsers::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassUsers::Table, ClassUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建测验表
        manager
            .create_table(
                Table::create()
                    .table(Quizzes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Quizzes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Quizzes::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::Title).string().not_null())
                    .col(ColumnDef::new(Quizzes::Description).text().null())
                    .col(ColumnDef::new(Quizzes::AttemptsAllowed).integer().null())
                    .col(ColumnDef::new(Quizzes::StartTime).big_integer().null())
                    .col(ColumnDef::new(Quizzes::EndTime).big_integer().null())
                    .col(
                        ColumnDef::new(Quizzes::TimeLimitSeconds)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Quizzes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Quizzes::Table, Quizzes::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Quizzes::Table, Quizzes::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建测验页表
        manager
            .create_table(
                Table::create()
                    .table(QuizPages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizPages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizPages::QuizId).big_integer().not_null())
                    .col(ColumnDef::new(QuizPages::PageUid).string().not_null())
                    .col(ColumnDef::new(QuizPages::Position).integer().not_null())
                    .col(ColumnDef::new(QuizPages::Title).string().not_null())
                    .col(ColumnDef::new(QuizPages::Questions).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuizPages::Table, QuizPages::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作答表
        manager
            .create_table(
                Table::create()
                    .table(QuizAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizAttempts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizAttempts::QuizId).big_integer().not_null())
                    .col(
                        ColumnDef::new(QuizAttempts::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QuizAttempts::AttemptNo).integer().not_null())
                    .col(ColumnDef::new(QuizAttempts::Status).string().not_null())
                    .col(
                        ColumnDef::new(QuizAttempts::StartedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QuizAttempts::ExpiresAt).big_integer().null())
                    .col(
                        ColumnDef::new(QuizAttempts::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(QuizAttempts::Score).double().null())
                    .col(ColumnDef::new(QuizAttempts::Answers).text().not_null())
                    .col(ColumnDef::new(QuizAttempts::Grading).text().not_null())
                    .col(ColumnDef::new(QuizAttempts::GraderId).big_integer().null())
                    .col(ColumnDef::new(QuizAttempts::GradedAt).big_integer().null())
                    .col(ColumnDef::new(QuizAttempts::Comment).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuizAttempts::Table, QuizAttempts::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuizAttempts::Table, QuizAttempts::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notifications::RecipientId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::SenderId).big_integer().null())
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(ColumnDef::new(Notifications::Link).string().null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::RecipientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_users_class_id")
                    .table(ClassUsers::Table)
                    .col(ClassUsers::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quizzes_class_id")
                    .table(Quizzes::Table)
                    .col(Quizzes::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_pages_quiz_id")
                    .table(QuizPages::Table)
                    .col(QuizPages::QuizId)
                    .col(QuizPages::Position)
                    .to_owned(),
            )
            .await?;

        // 同一学生在同一测验下的作答序号唯一，用于并发开始作答时防止超出次数限制
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_attempts_quiz_student_no")
                    .table(QuizAttempts::Table)
                    .col(QuizAttempts::QuizId)
                    .col(QuizAttempts::StudentId)
                    .col(QuizAttempts::AttemptNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_recipient_id")
                    .table(Notifications::Table)
                    .col(Notifications::RecipientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizPages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quizzes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Role,
    Status,
    DisplayName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
    TeacherId,
    ClassName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClassUsers {
    #[sea_orm(iden = "class_users")]
    Table,
    Id,
    ClassId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Quizzes {
    #[sea_orm(iden = "quizzes")]
    Table,
    Id,
    ClassId,
    CreatedBy,
    Title,
    Description,
    AttemptsAllowed,
    StartTime,
    EndTime,
    TimeLimitSeconds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum QuizPages {
    #[sea_orm(iden = "quiz_pages")]
    Table,
    Id,
    QuizId,
    PageUid,
    Position,
    Title,
    Questions,
}

#[derive(DeriveIden)]
enum QuizAttempts {
    #[sea_orm(iden = "quiz_attempts")]
    Table,
    Id,
    QuizId,
    StudentId,
    AttemptNo,
    Status,
    StartedAt,
    ExpiresAt,
    SubmittedAt,
    Score,
    Answers,
    Grading,
    GraderId,
    GradedAt,
    Comment,
}

#[derive(DeriveIden)]
enum Notifications {
    #[sea_orm(iden = "notifications")]
    Table,
    Id,
    RecipientId,
    SenderId,
    NotificationType,
    Message,
    Link,
    IsRead,
    CreatedAt,
}
