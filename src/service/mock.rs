use crate::error::ServiceError;
use crate::models::{AnswerSet, QuizListing, QuizPayload, SubmitReceipt};
use crate::service::QuizDataService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory service for tests. Counts submissions and can delay or reject
/// them.
#[derive(Debug, Clone, Default)]
pub struct MockQuizService {
    quizzes: HashMap<String, QuizPayload>,
    reject: bool,
    fail_submit: bool,
    submit_delay: Option<Duration>,
    submit_calls: Arc<AtomicUsize>,
}

impl MockQuizService {
    pub fn with_quiz(id: &str, payload: QuizPayload) -> Self {
        let mut service = Self::default();
        service.quizzes.insert(id.to_string(), payload);
        service
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizDataService for MockQuizService {
    async fn list_quizzes(&self) -> Result<Vec<QuizListing>, ServiceError> {
        let mut listings: Vec<QuizListing> = self
            .quizzes
            .iter()
            .map(|(id, payload)| QuizListing {
                id: id.clone(),
                name: payload.name.clone().unwrap_or_else(|| id.clone()),
                duration_seconds: payload.duration_seconds,
                question_count: payload.questions.as_ref().map(Vec::len),
            })
            .collect();
        listings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listings)
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizPayload, ServiceError> {
        self.quizzes
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(quiz_id.to_string()))
    }

    async fn submit_answers(
        &self,
        quiz_id: &str,
        _answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ServiceError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.submit_delay {
            std::thread::sleep(delay);
        }
        if self.fail_submit {
            return Err(ServiceError::NotFound(quiz_id.to_string()));
        }
        Ok(SubmitReceipt {
            accepted: !self.reject,
        })
    }

    fn describe(&self) -> String {
        "Mock".to_string()
    }
}
