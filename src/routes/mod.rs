pub mod attempts;

pub mod quizzes;

pub use attempts::configure_attempt_routes;
pub use quizzes::configure_quiz_routes;
