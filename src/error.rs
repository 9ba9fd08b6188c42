use reqwest::StatusCode;

/// Failure talking to a quiz data service, remote or local.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Api error: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed quiz file {file}: {reason}")]
    Malformed { file: String, reason: String },

    #[error("Quiz not found: {0}")]
    NotFound(String),

    #[error("Invalid service url {0}")]
    InvalidUrl(String),
}

/// Fatal to a session: the quiz could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Could not fetch quiz: {0}")]
    Service(#[from] ServiceError),

    #[error("Quiz payload is incomplete: {0}")]
    Incomplete(String),
}

/// Non-fatal: the local result stands even when forwarding fails.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionForwardError {
    #[error("Could not forward answers: {0}")]
    Service(#[from] ServiceError),

    #[error("Service did not accept the submission")]
    Rejected,
}

/// Programmer error: an operation was called with arguments or in a state
/// the session cannot honour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("No question with id {0}")]
    UnknownQuestion(usize),

    #[error("Question {question_id} has no option {option:?}")]
    UnknownOption { question_id: usize, option: String },

    #[error("Session is not in progress")]
    NotInProgress,
}

/// Top-level errors of the terminal application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("Service setup failed: {0}")]
    Service(#[from] ServiceError),
}
