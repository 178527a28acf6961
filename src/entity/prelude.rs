//! 预导入模块，方便使用

pub use super::class_users::{
    ActiveModel as ClassUserActiveModel, Entity as ClassUsers, Model as ClassUserModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::quiz_attempts::{
    ActiveModel as QuizAttemptActiveModel, Entity as QuizAttempts, Model as QuizAttemptModel,
};
pub use super::quiz_pages::{
    ActiveModel as QuizPageActiveModel, Entity as QuizPages, Model as QuizPageModel,
};
pub use super::quizzes::{ActiveModel as QuizActiveModel, Entity as Quizzes, Model as QuizModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
