//! State machine for one attempt at one quiz.
//!
//! ```text
//! NotStarted --load--> InProgress(1)
//! InProgress --request_submit--> ConfirmingSubmission --cancel--> InProgress
//! ConfirmingSubmission --confirm_submit--> Submitted
//! InProgress --tick to zero--> Submitted
//! ```
//!
//! `Submitted` is terminal. A retake starts from a fresh controller.

use crate::error::{InvariantViolation, LoadError, SubmissionForwardError};
use crate::models::{
    AnswerSet, EndedBy, ForwardRequest, ForwardStatus, QuizDefinition, QuizResult, SessionState,
    SubmitReceipt, SubmitSummary,
};
use crate::scoring::score;
use crate::service::QuizDataService;
use crate::timer::SessionTimer;
use tracing::{info, warn};

#[derive(Debug)]
pub struct QuizSessionController {
    quiz: Option<QuizDefinition>,
    answers: AnswerSet,
    timer: SessionTimer,
    state: SessionState,
    forward_enabled: bool,
    forward_in_flight: bool,
    forward_status: ForwardStatus,
}

impl Default for QuizSessionController {
    fn default() -> Self {
        Self::new(true)
    }
}

impl QuizSessionController {
    pub fn new(forward_enabled: bool) -> Self {
        Self {
            quiz: None,
            answers: AnswerSet::new(),
            timer: SessionTimer::new(0),
            state: SessionState::NotStarted,
            forward_enabled,
            forward_in_flight: false,
            forward_status: ForwardStatus::Disabled,
        }
    }

    /// Fetches and validates a quiz, then begins the attempt.
    pub async fn load_quiz(
        &mut self,
        service: &dyn QuizDataService,
        quiz_id: &str,
    ) -> Result<(), LoadError> {
        let quiz = fetch_definition(service, quiz_id).await?;
        self.begin(quiz);
        Ok(())
    }

    /// Enters `InProgress` on page 1 with the timer armed but not running.
    /// Ignored unless the controller is still `NotStarted`.
    pub fn begin(&mut self, quiz: QuizDefinition) {
        if self.state != SessionState::NotStarted {
            warn!("Ignoring quiz {} for a session that already started", quiz.id);
            return;
        }
        info!(
            "Starting quiz {} ({} questions, {}s)",
            quiz.id,
            quiz.questions.len(),
            quiz.duration_seconds
        );
        self.timer = SessionTimer::new(quiz.duration_seconds);
        self.answers = AnswerSet::new();
        self.quiz = Some(quiz);
        self.state = SessionState::InProgress { page: 1 };
    }

    pub fn quiz(&self) -> Option<&QuizDefinition> {
        self.quiz.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn forward_status(&self) -> &ForwardStatus {
        &self.forward_status
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, SessionState::InProgress { .. })
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SessionState::Submitted(_))
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            SessionState::Submitted(result) => Some(result),
            _ => None,
        }
    }

    /// Current 1-based page while the attempt is open.
    pub fn current_page(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { page } | SessionState::ConfirmingSubmission { page } => {
                Some(page)
            }
            _ => None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, QuizDefinition::page_count)
    }

    /// Records `option` for `question_id`, replacing an earlier choice. The
    /// first selection of the attempt starts the timer.
    pub fn select_answer(
        &mut self,
        question_id: usize,
        option: &str,
    ) -> Result<(), InvariantViolation> {
        if !self.is_in_progress() {
            return Err(InvariantViolation::NotInProgress);
        }
        let quiz = self.quiz.as_ref().ok_or(InvariantViolation::NotInProgress)?;
        let question = quiz
            .question(question_id)
            .ok_or(InvariantViolation::UnknownQuestion(question_id))?;
        if !question.has_option(option) {
            return Err(InvariantViolation::UnknownOption {
                question_id,
                option: option.to_string(),
            });
        }

        self.answers.select(question_id, option);
        if self.timer.start() {
            info!("Timer started with {}s remaining", self.timer.remaining());
        }
        Ok(())
    }

    pub fn advance_page(&mut self) {
        let last = self.page_count().max(1);
        if let SessionState::InProgress { page } = &mut self.state
            && *page < last
        {
            *page += 1;
        }
    }

    pub fn retreat_page(&mut self) {
        if let SessionState::InProgress { page } = &mut self.state
            && *page > 1
        {
            *page -= 1;
        }
    }

    /// One second of wall time. Only counts while in progress with the
    /// timer running. Reaching zero scores the attempt immediately; the
    /// returned request, if any, should be forwarded to the data service.
    pub fn tick(&mut self) -> Option<ForwardRequest> {
        if !self.is_in_progress() || !self.timer.is_running() {
            return None;
        }
        self.timer.tick();
        if !self.timer.is_expired() {
            return None;
        }
        info!("Time is up, submitting automatically");
        self.finish(EndedBy::Timeout)
    }

    pub fn request_submit(&mut self) -> Option<SubmitSummary> {
        let SessionState::InProgress { page } = self.state else {
            return None;
        };
        self.state = SessionState::ConfirmingSubmission { page };
        Some(self.submit_summary())
    }

    pub fn cancel_submit(&mut self) {
        if let SessionState::ConfirmingSubmission { page } = self.state {
            self.state = SessionState::InProgress { page };
        }
    }

    pub fn submit_summary(&self) -> SubmitSummary {
        SubmitSummary {
            answered: self.answers.len(),
            total: self.quiz.as_ref().map_or(0, |q| q.questions.len()),
            seconds_remaining: self.timer.remaining(),
        }
    }

    /// Scores the attempt and moves to `Submitted`. Returns the forward
    /// request at most once per attempt; later calls are no-ops.
    pub fn confirm_submit(&mut self) -> Option<ForwardRequest> {
        if !matches!(self.state, SessionState::ConfirmingSubmission { .. }) {
            return None;
        }
        self.finish(EndedBy::Manual)
    }

    /// Records how forwarding went. The local result is never touched.
    pub fn record_forward_outcome(&mut self, outcome: &Result<SubmitReceipt, SubmissionForwardError>) {
        self.forward_in_flight = false;
        self.forward_status = forward_status_for(outcome);
    }

    fn finish(&mut self, ended_by: EndedBy) -> Option<ForwardRequest> {
        let quiz = self.quiz.as_ref()?;
        self.timer.stop();
        let result = score(quiz, &self.answers, ended_by, self.timer.remaining());
        info!(
            "Quiz {} submitted ({}): {}/{} ({}%)",
            quiz.id,
            ended_by.as_str(),
            result.score,
            result.total,
            result.percentage
        );
        let quiz_id = quiz.id.clone();
        self.state = SessionState::Submitted(result);

        if !self.forward_enabled || self.forward_in_flight {
            return None;
        }
        self.forward_in_flight = true;
        self.forward_status = ForwardStatus::Pending;
        Some(ForwardRequest {
            quiz_id,
            answers: self.answers.clone(),
        })
    }
}

/// Maps a forwarding outcome to the status shown and stored for an attempt.
pub fn forward_status_for(outcome: &Result<SubmitReceipt, SubmissionForwardError>) -> ForwardStatus {
    match outcome {
        Ok(receipt) if receipt.accepted => {
            info!("Submission accepted by the quiz service");
            ForwardStatus::Accepted
        }
        Ok(_) | Err(SubmissionForwardError::Rejected) => {
            warn!("Submission rejected by the quiz service");
            ForwardStatus::Rejected
        }
        Err(e) => {
            warn!("Forwarding answers failed: {}", e);
            ForwardStatus::Failed(e.to_string())
        }
    }
}

/// Fetch plus validation, shared by the controller and the service worker.
pub async fn fetch_definition(
    service: &dyn QuizDataService,
    quiz_id: &str,
) -> Result<QuizDefinition, LoadError> {
    info!("Loading quiz {}", quiz_id);
    let payload = service.fetch_quiz(quiz_id).await?;
    QuizDefinition::from_payload(quiz_id, payload)
}

/// Sends a forward request and folds both failure kinds into
/// [`SubmissionForwardError`].
pub async fn forward_answers(
    service: &dyn QuizDataService,
    request: &ForwardRequest,
) -> Result<SubmitReceipt, SubmissionForwardError> {
    let receipt = service
        .submit_answers(&request.quiz_id, &request.answers)
        .await?;
    if receipt.accepted {
        Ok(receipt)
    } else {
        Err(SubmissionForwardError::Rejected)
    }
}
