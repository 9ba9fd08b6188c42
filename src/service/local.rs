use crate::csv::{get_quiz_files, parse_quiz_csv};
use crate::error::ServiceError;
use crate::models::{AnswerSet, QuizListing, QuizPayload, SubmitReceipt};
use crate::service::QuizDataService;
use async_trait::async_trait;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRecord<'a> {
    quiz_id: &'a str,
    submitted_at: String,
    answers: &'a AnswerSet,
}

/// Quiz backend over a directory of `.json`/`.csv` quiz files. Submissions
/// are written as JSON files, one per attempt.
#[derive(Debug, Clone)]
pub struct LocalQuizService {
    quizzes_dir: PathBuf,
    submissions_dir: PathBuf,
}

impl LocalQuizService {
    pub fn new(quizzes_dir: impl Into<PathBuf>, submissions_dir: impl Into<PathBuf>) -> Self {
        Self {
            quizzes_dir: quizzes_dir.into(),
            submissions_dir: submissions_dir.into(),
        }
    }

    fn find_file(&self, quiz_id: &str) -> Option<PathBuf> {
        get_quiz_files(&self.quizzes_dir)
            .into_iter()
            .find(|path| quiz_id_of(path).as_deref() == Some(quiz_id))
    }
}

fn quiz_id_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

pub fn read_quiz_file(path: &Path) -> Result<QuizPayload, ServiceError> {
    let content = fs::read_to_string(path)?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        parse_quiz_csv(&content).map_err(|reason| ServiceError::Malformed {
            file: path.display().to_string(),
            reason,
        })
    }
}

#[async_trait]
impl QuizDataService for LocalQuizService {
    async fn list_quizzes(&self) -> Result<Vec<QuizListing>, ServiceError> {
        let mut listings = Vec::new();
        for path in get_quiz_files(&self.quizzes_dir) {
            let Some(id) = quiz_id_of(&path) else {
                continue;
            };
            match read_quiz_file(&path) {
                Ok(payload) => listings.push(QuizListing {
                    name: payload.name.clone().unwrap_or_else(|| id.clone()),
                    id,
                    duration_seconds: payload.duration_seconds,
                    question_count: payload.questions.as_ref().map(Vec::len),
                }),
                Err(e) => warn!("Skipping quiz file {}: {}", path.display(), e),
            }
        }
        Ok(listings)
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizPayload, ServiceError> {
        let path = self
            .find_file(quiz_id)
            .ok_or_else(|| ServiceError::NotFound(quiz_id.to_string()))?;
        read_quiz_file(&path)
    }

    async fn submit_answers(
        &self,
        quiz_id: &str,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ServiceError> {
        fs::create_dir_all(&self.submissions_dir)?;
        let now = chrono::Local::now();
        let file = self.submissions_dir.join(format!(
            "{}-{}.json",
            quiz_id,
            now.format("%Y%m%d-%H%M%S%3f")
        ));
        let record = SubmissionRecord {
            quiz_id,
            submitted_at: now.to_rfc3339(),
            answers,
        };
        fs::write(&file, serde_json::to_string_pretty(&record)?)?;
        info!("Recorded submission to {}", file.display());
        Ok(SubmitReceipt { accepted: true })
    }

    fn describe(&self) -> String {
        format!("Local: {}", self.quizzes_dir.display())
    }
}
