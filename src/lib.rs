pub mod app;
pub mod config;
pub mod controller;
pub mod csv;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod report;
pub mod scoring;
pub mod service;
pub mod session;
pub mod timer;
pub mod ui;
pub mod utils;
pub mod worker;

// Re-exports for convenience
pub use app::App;
pub use config::AppConfig;
pub use controller::QuizSessionController;
pub use error::{AppError, InvariantViolation, LoadError, ServiceError, SubmissionForwardError};
pub use models::{
    AnswerSet, AppState, EndedBy, ForwardStatus, QuizDefinition, QuizResult, ServiceRequest,
    ServiceResponse, SessionState,
};
pub use service::{HttpQuizService, LocalQuizService, QuizDataService};
pub use timer::{SessionTimer, Ticker};
pub use worker::spawn_service_worker;
