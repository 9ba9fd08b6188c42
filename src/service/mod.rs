pub mod http;
pub mod local;
#[cfg(test)]
pub mod mock;

use crate::error::ServiceError;
use crate::models::{AnswerSet, QuizListing, QuizPayload, SubmitReceipt};
use async_trait::async_trait;

pub use http::HttpQuizService;
pub use local::LocalQuizService;

/// Backend that owns quiz content and answer persistence.
#[async_trait]
pub trait QuizDataService: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<QuizListing>, ServiceError>;

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizPayload, ServiceError>;

    /// Best-effort; callers keep their local result when this fails.
    async fn submit_answers(
        &self,
        quiz_id: &str,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ServiceError>;

    /// Short label for the menu status panel.
    fn describe(&self) -> String;
}
