use crate::error::{LoadError, ServiceError, SubmissionForwardError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PAGE_SIZE: usize = 3;

/// Quiz content as the data service sends it. Fields the service may omit
/// are optional here so that an incomplete payload can be reported as such
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionPayload>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub question_count: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// 1-based position in the quiz.
    pub id: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizDefinition {
    pub id: String,
    pub name: String,
    pub duration_seconds: u64,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    /// Validates a service payload. Missing or empty questions, a missing or
    /// zero duration, and questions without a prompt or options are all
    /// reported as [`LoadError::Incomplete`].
    pub fn from_payload(id: &str, payload: QuizPayload) -> Result<Self, LoadError> {
        let duration_seconds = match payload.duration_seconds {
            Some(0) | None => {
                return Err(LoadError::Incomplete("missing duration".to_string()));
            }
            Some(d) => d,
        };

        let questions = match payload.questions {
            Some(q) if !q.is_empty() => q,
            _ => return Err(LoadError::Incomplete("missing questions".to_string())),
        };

        let mut validated = Vec::with_capacity(questions.len());
        for (index, q) in questions.into_iter().enumerate() {
            let question_id = index + 1;
            if q.prompt.trim().is_empty() {
                return Err(LoadError::Incomplete(format!(
                    "question {} has no prompt",
                    question_id
                )));
            }
            if q.options.is_empty() {
                return Err(LoadError::Incomplete(format!(
                    "question {} has no options",
                    question_id
                )));
            }
            if !q.options.contains(&q.correct_answer) {
                tracing::warn!(
                    "Quiz {} question {}: correct answer is not one of the options",
                    id,
                    question_id
                );
            }
            validated.push(Question {
                id: question_id,
                prompt: q.prompt,
                options: q.options,
                correct_answer: q.correct_answer,
            });
        }

        let name = payload
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        Ok(Self {
            id: id.to_string(),
            name,
            duration_seconds,
            questions: validated,
        })
    }

    pub fn question(&self, id: usize) -> Option<&Question> {
        id.checked_sub(1).and_then(|i| self.questions.get(i))
    }

    pub fn page_count(&self) -> usize {
        self.questions.len().div_ceil(PAGE_SIZE)
    }

    /// Questions visible on a 1-based page.
    pub fn page(&self, page: usize) -> &[Question] {
        let start = page.saturating_sub(1) * PAGE_SIZE;
        if start >= self.questions.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.questions.len());
        &self.questions[start..end]
    }
}

/// One selected option per question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet(BTreeMap<usize, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the answer for `question_id`.
    pub fn select(&mut self, question_id: usize, option: impl Into<String>) {
        self.0.insert(question_id, option.into());
    }

    pub fn get(&self, question_id: usize) -> Option<&str> {
        self.0.get(&question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(id, option)| (*id, option.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, o)| (id, o.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndedBy {
    Manual,
    Timeout,
}

impl EndedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndedBy::Manual => "manual",
            EndedBy::Timeout => "timeout",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "timeout" => EndedBy::Timeout,
            _ => EndedBy::Manual,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionOutcome {
    pub question_id: usize,
    pub prompt: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub ended_by: EndedBy,
    pub seconds_remaining: u64,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Summary shown while the user is asked to confirm submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitSummary {
    pub answered: usize,
    pub total: usize,
    pub seconds_remaining: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    NotStarted,
    InProgress { page: usize },
    ConfirmingSubmission { page: usize },
    Submitted(QuizResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardStatus {
    Disabled,
    Pending,
    Accepted,
    Rejected,
    Failed(String),
}

impl ForwardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForwardStatus::Disabled => "disabled",
            ForwardStatus::Pending => "pending",
            ForwardStatus::Accepted => "accepted",
            ForwardStatus::Rejected => "rejected",
            ForwardStatus::Failed(_) => "failed",
        }
    }

    /// Reads back a stored status. Failure reasons are not stored.
    pub fn parse(s: &str) -> Self {
        match s {
            "disabled" => ForwardStatus::Disabled,
            "accepted" => ForwardStatus::Accepted,
            "rejected" => ForwardStatus::Rejected,
            "failed" => ForwardStatus::Failed(String::new()),
            _ => ForwardStatus::Pending,
        }
    }
}

/// Answers to hand to the data service once an attempt is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRequest {
    pub quiz_id: String,
    pub answers: AnswerSet,
}

#[derive(Debug)]
pub enum ServiceRequest {
    List,
    Load {
        generation: u64,
        quiz_id: String,
    },
    Submit {
        generation: u64,
        request: ForwardRequest,
    },
}

#[derive(Debug)]
pub enum ServiceResponse {
    Listed(Result<Vec<QuizListing>, ServiceError>),
    Loaded {
        generation: u64,
        result: Result<QuizDefinition, LoadError>,
    },
    Forwarded {
        generation: u64,
        result: Result<SubmitReceipt, SubmissionForwardError>,
    },
}

#[derive(Debug, PartialEq)]
pub enum AppState {
    Menu,
    MenuDeleteConfirm,
    Loading,
    Quiz,
    QuizQuitConfirm,
    Summary,
    AttemptDetail,
}
