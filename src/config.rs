use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Settings layered from defaults, an optional `quiz.toml` and `QUIZ_*`
/// environment variables, in that order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the remote quiz service. Local files are used when unset.
    pub service_url: Option<String>,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub quizzes_dir: PathBuf,
    pub submissions_dir: PathBuf,
    pub forward_submissions: bool,
    pub log_file: PathBuf,
    pub db_path: Option<PathBuf>,
    pub reports_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources("quiz", Environment::with_prefix("QUIZ"))
    }

    pub fn from_sources(file_stem: &str, env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("request_timeout_secs", 10)?
            .set_default("quizzes_dir", "quizzes")?
            .set_default("submissions_dir", "submissions")?
            .set_default("forward_submissions", true)?
            .set_default("log_file", "quiz_debug.log")?
            .set_default("reports_dir", "results")?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(crate::db::default_db_path)
    }
}
