use crate::config::AppConfig;
use crate::controller::forward_status_for;
use crate::db::attempt::{self, AttemptSummary};
use crate::error::{LoadError, ServiceError, SubmissionForwardError};
use crate::models::{
    AppState, ForwardRequest, ForwardStatus, QuizDefinition, QuizListing, QuizResult,
    ServiceRequest, ServiceResponse, SessionState, SubmitReceipt,
};
use crate::report::write_result_report;
use crate::session::{handle_quiz_input, QuizScreen};
use crate::ui::{
    draw_delete_confirmation, draw_loading, draw_menu, draw_quit_confirmation, draw_quiz,
    draw_submit_confirmation, draw_summary, format_attempt_date, MenuView, RESULT_HINTS,
    STORED_ATTEMPT_HINTS,
};
use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use rusqlite::Connection;
use std::collections::HashMap;
use std::io;
use tracing::{debug, error, info, warn};

const HISTORY_LIMIT: usize = 50;

const PANEL_QUIZZES: usize = 0;
const PANEL_HISTORY: usize = 1;

/// A past attempt read back from the history database.
struct StoredAttempt {
    summary: AttemptSummary,
    result: QuizResult,
    forward_status: ForwardStatus,
}

/// Top-level application state: menu selection, the open attempt and the
/// channel to the service worker.
pub struct App {
    state: AppState,
    config: AppConfig,
    service_label: String,
    quizzes: Vec<QuizListing>,
    quizzes_error: Option<String>,
    attempts: Vec<AttemptSummary>,
    selected_quiz: usize,
    selected_attempt: usize,
    focused_panel: usize,
    screen: Option<QuizScreen>,
    viewed_attempt: Option<StoredAttempt>,
    /// Bumped on every load and retake; responses tagged with an older
    /// value are stale.
    generation: u64,
    loading_quiz: Option<String>,
    notice: Option<String>,
    should_quit: bool,
    requests: Sender<ServiceRequest>,
    db: Option<Connection>,
    /// Generation of a forwarded attempt to its history row.
    pending_forwards: HashMap<u64, u64>,
}

impl App {
    pub fn new(
        config: AppConfig,
        service_label: String,
        requests: Sender<ServiceRequest>,
        db: Option<Connection>,
    ) -> Self {
        let mut app = Self {
            state: AppState::Menu,
            config,
            service_label,
            quizzes: Vec::new(),
            quizzes_error: None,
            attempts: Vec::new(),
            selected_quiz: 0,
            selected_attempt: 0,
            focused_panel: PANEL_QUIZZES,
            screen: None,
            viewed_attempt: None,
            generation: 0,
            loading_quiz: None,
            notice: None,
            should_quit: false,
            requests,
            db,
            pending_forwards: HashMap::new(),
        };
        app.refresh_quizzes();
        app.refresh_attempts();
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn send(&mut self, request: ServiceRequest) -> bool {
        if self.requests.send(request).is_err() {
            error!("Service worker is gone");
            self.notice = Some("Quiz service unavailable".to_string());
            return false;
        }
        true
    }

    fn refresh_quizzes(&mut self) {
        self.send(ServiceRequest::List);
    }

    fn refresh_attempts(&mut self) {
        let Some(db) = &self.db else {
            return;
        };
        match attempt::list_recent_attempts(db, HISTORY_LIMIT) {
            Ok(attempts) => self.attempts = attempts,
            Err(e) => warn!("Failed to list attempts: {}", e),
        }
        self.selected_attempt = self
            .selected_attempt
            .min(self.attempts.len().saturating_sub(1));
    }

    fn start_loading(&mut self, quiz_id: String, quiz_name: String) {
        self.generation += 1;
        let generation = self.generation;
        info!("Requesting quiz {} (generation {})", quiz_id, generation);
        if self.send(ServiceRequest::Load {
            generation,
            quiz_id,
        }) {
            self.loading_quiz = Some(quiz_name);
            self.notice = None;
            self.state = AppState::Loading;
        }
    }

    fn open_attempt(&mut self, quiz: QuizDefinition) {
        self.screen = Some(QuizScreen::new(
            self.generation,
            self.config.forward_submissions,
            quiz,
        ));
        self.notice = None;
        self.state = AppState::Quiz;
    }

    /// A retake goes through a fresh load, like picking the quiz again.
    fn retake(&mut self) {
        let Some((id, name)) = self
            .screen
            .as_ref()
            .and_then(|s| s.controller.quiz())
            .map(|q| (q.id.clone(), q.name.clone()))
        else {
            return;
        };
        self.start_loading(id, name);
    }

    fn back_to_menu(&mut self) {
        self.screen = None;
        self.viewed_attempt = None;
        self.state = AppState::Menu;
        self.refresh_attempts();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Menu => self.handle_menu_key(key),
            AppState::MenuDeleteConfirm => match key.code {
                KeyCode::Char('y') => {
                    self.delete_selected_attempt();
                    self.state = AppState::Menu;
                }
                KeyCode::Char('n') | KeyCode::Esc => self.state = AppState::Menu,
                _ => {}
            },
            AppState::Loading => {
                if key.code == KeyCode::Esc {
                    // Invalidate the in-flight load.
                    self.generation += 1;
                    self.screen = None;
                    self.loading_quiz = None;
                    self.notice = Some("Loading cancelled".to_string());
                    self.state = AppState::Menu;
                }
            }
            AppState::Quiz => {
                let Some(screen) = self.screen.as_mut() else {
                    self.state = AppState::Menu;
                    return;
                };
                let was_submitted = screen.controller.is_submitted();
                let forward = handle_quiz_input(screen, key, &mut self.state);
                if !was_submitted && screen.controller.is_submitted() {
                    self.on_submitted(forward);
                }
            }
            AppState::QuizQuitConfirm => match key.code {
                KeyCode::Char('y') => {
                    info!("Attempt abandoned");
                    self.back_to_menu();
                }
                KeyCode::Char('n') | KeyCode::Esc => self.state = AppState::Quiz,
                _ => {}
            },
            AppState::Summary => match key.code {
                KeyCode::Char('e') => self.export_report(),
                KeyCode::Char('r') => self.retake(),
                KeyCode::Char('m') => self.back_to_menu(),
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            AppState::AttemptDetail => match key.code {
                KeyCode::Char('r') => {
                    if let Some(stored) = self.viewed_attempt.take() {
                        self.start_loading(stored.summary.quiz_id, stored.summary.quiz_name);
                    }
                }
                KeyCode::Char('m') | KeyCode::Esc => self.back_to_menu(),
                _ => {}
            },
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('1') => self.focused_panel = PANEL_QUIZZES,
            KeyCode::Char('2') => self.focused_panel = PANEL_HISTORY,
            KeyCode::Tab => self.focused_panel = 1 - self.focused_panel,
            KeyCode::Up | KeyCode::Char('k') => {
                let selected = self.selected_mut();
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = if self.focused_panel == PANEL_QUIZZES {
                    self.quizzes.len()
                } else {
                    self.attempts.len()
                };
                let selected = self.selected_mut();
                if *selected < len.saturating_sub(1) {
                    *selected += 1;
                }
            }
            KeyCode::Enter => {
                if self.focused_panel == PANEL_HISTORY {
                    self.open_stored_attempt();
                } else if let Some((id, name)) = self
                    .quizzes
                    .get(self.selected_quiz)
                    .map(|q| (q.id.clone(), q.name.clone()))
                {
                    self.start_loading(id, name);
                }
            }
            KeyCode::Char('d') => {
                if self.focused_panel == PANEL_HISTORY && !self.attempts.is_empty() {
                    self.state = AppState::MenuDeleteConfirm;
                }
            }
            KeyCode::Char('r') => {
                self.notice = None;
                self.refresh_quizzes();
                self.refresh_attempts();
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn selected_mut(&mut self) -> &mut usize {
        if self.focused_panel == PANEL_QUIZZES {
            &mut self.selected_quiz
        } else {
            &mut self.selected_attempt
        }
    }

    /// Reads the selected history entry and its answers back from the
    /// database.
    fn open_stored_attempt(&mut self) {
        let (Some(id), Some(db)) = (
            self.attempts.get(self.selected_attempt).map(|a| a.id),
            self.db.as_ref(),
        ) else {
            return;
        };

        let loaded = attempt::get_attempt(db, id).and_then(|summary| {
            summary
                .map(|s| attempt::load_attempt_answers(db, id).map(|outcomes| (s, outcomes)))
                .transpose()
        });
        match loaded {
            Ok(Some((summary, outcomes))) => {
                debug!("Opened attempt {} with {} answers", id, outcomes.len());
                let result = QuizResult {
                    score: summary.score,
                    total: summary.total,
                    percentage: summary.percentage,
                    ended_by: summary.ended_by,
                    seconds_remaining: summary.seconds_remaining,
                    outcomes,
                };
                let forward_status = ForwardStatus::parse(&summary.forward_status);
                self.viewed_attempt = Some(StoredAttempt {
                    summary,
                    result,
                    forward_status,
                });
                self.notice = None;
                self.state = AppState::AttemptDetail;
            }
            Ok(None) => {
                self.notice = Some("That attempt no longer exists".to_string());
                self.refresh_attempts();
            }
            Err(e) => {
                warn!("Failed to read attempt {}: {}", id, e);
                self.notice = Some(format!("Could not open attempt: {}", e));
            }
        }
    }

    fn delete_selected_attempt(&mut self) {
        let Some(id) = self.attempts.get(self.selected_attempt).map(|a| a.id) else {
            return;
        };
        let Some(db) = self.db.as_mut() else {
            return;
        };
        match attempt::delete_attempt(db, id) {
            Ok(()) => info!("Deleted attempt {}", id),
            Err(e) => {
                warn!("Failed to delete attempt {}: {}", id, e);
                self.notice = Some(format!("Could not delete attempt: {}", e));
            }
        }
        self.refresh_attempts();
    }

    /// Drives the countdown of the open attempt.
    pub fn on_tick(&mut self) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        let was_submitted = screen.controller.is_submitted();
        let forward = screen.on_tick();
        if !was_submitted && screen.controller.is_submitted() {
            self.state = AppState::Summary;
            self.on_submitted(forward);
        }
    }

    /// Runs once per attempt, right after it is scored.
    fn on_submitted(&mut self, forward: Option<ForwardRequest>) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        let generation = screen.generation;

        if let (Some(db), Some(quiz), Some(result)) = (
            self.db.as_mut(),
            screen.controller.quiz(),
            screen.controller.result(),
        ) {
            match attempt::record_attempt(db, quiz, result, screen.controller.forward_status()) {
                Ok(id) => screen.attempt_id = Some(id),
                Err(e) => {
                    warn!("Failed to record attempt: {}", e);
                    screen.notice = Some("Attempt not saved to history".to_string());
                }
            }
        }
        let attempt_id = screen.attempt_id;

        if let Some(request) = forward {
            if let Some(id) = attempt_id {
                self.pending_forwards.insert(generation, id);
            }
            if !self.send(ServiceRequest::Submit {
                generation,
                request,
            }) {
                let outcome = Err(SubmissionForwardError::Service(ServiceError::Io(
                    io::Error::new(io::ErrorKind::BrokenPipe, "service worker stopped"),
                )));
                self.apply_forward_outcome(generation, &outcome);
            }
        }
        self.refresh_attempts();
    }

    pub fn handle_response(&mut self, response: ServiceResponse) {
        match response {
            ServiceResponse::Listed(Ok(quizzes)) => {
                debug!("Listed {} quizzes", quizzes.len());
                self.quizzes = quizzes;
                self.quizzes_error = None;
                self.selected_quiz = self
                    .selected_quiz
                    .min(self.quizzes.len().saturating_sub(1));
            }
            ServiceResponse::Listed(Err(e)) => {
                self.quizzes_error = Some(e.to_string());
            }
            ServiceResponse::Loaded { generation, result } => {
                self.on_loaded(generation, result);
            }
            ServiceResponse::Forwarded { generation, result } => {
                self.apply_forward_outcome(generation, &result);
            }
        }
    }

    fn on_loaded(&mut self, generation: u64, result: Result<QuizDefinition, LoadError>) {
        if generation != self.generation || self.state != AppState::Loading {
            debug!("Ignoring stale load response (generation {})", generation);
            return;
        }
        self.loading_quiz = None;
        match result {
            Ok(quiz) => self.open_attempt(quiz),
            Err(e) => {
                self.notice = Some(e.to_string());
                self.state = AppState::Menu;
            }
        }
    }

    fn apply_forward_outcome(
        &mut self,
        generation: u64,
        outcome: &Result<SubmitReceipt, SubmissionForwardError>,
    ) {
        let status = match self.screen.as_mut() {
            Some(screen) if screen.generation == generation => {
                screen.controller.record_forward_outcome(outcome);
                screen.controller.forward_status().clone()
            }
            _ => forward_status_for(outcome),
        };

        if let Some(id) = self.pending_forwards.remove(&generation)
            && let Some(db) = &self.db
        {
            if let Err(e) = attempt::update_forward_status(db, id, &status) {
                warn!("Failed to update attempt {}: {}", id, e);
            }
            self.refresh_attempts();
        }
    }

    fn export_report(&mut self) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        let (Some(quiz), Some(result)) = (screen.controller.quiz(), screen.controller.result())
        else {
            return;
        };
        screen.notice = Some(
            match write_result_report(
                &self.config.reports_dir,
                quiz,
                result,
                screen.controller.forward_status(),
            ) {
                Ok(path) => {
                    info!("Wrote report {}", path.display());
                    format!("Saved {}", path.display())
                }
                Err(e) => {
                    warn!("Failed to write report: {}", e);
                    format!("Could not save report: {}", e)
                }
            },
        );
    }

    pub fn draw(&self, f: &mut Frame) {
        match self.state {
            AppState::Menu | AppState::MenuDeleteConfirm | AppState::Loading => {
                draw_menu(
                    f,
                    &MenuView {
                        quizzes: &self.quizzes,
                        quizzes_error: self.quizzes_error.as_deref(),
                        selected_quiz: self.selected_quiz,
                        attempts: &self.attempts,
                        history_available: self.db.is_some(),
                        selected_attempt: self.selected_attempt,
                        focused_panel: self.focused_panel,
                        service_label: &self.service_label,
                        notice: self.notice.as_deref(),
                    },
                );
                if self.state == AppState::MenuDeleteConfirm {
                    draw_delete_confirmation(f, self.attempts.get(self.selected_attempt));
                } else if self.state == AppState::Loading {
                    draw_loading(f, self.loading_quiz.as_deref().unwrap_or("quiz"));
                }
            }
            AppState::Quiz => {
                if let Some(screen) = &self.screen {
                    draw_quiz(f, screen);
                    if let SessionState::ConfirmingSubmission { .. } = screen.controller.state() {
                        draw_submit_confirmation(f, &screen.controller.submit_summary());
                    }
                }
            }
            AppState::QuizQuitConfirm => draw_quit_confirmation(f),
            AppState::Summary => {
                if let Some(screen) = &self.screen
                    && let (Some(quiz), Some(result)) =
                        (screen.controller.quiz(), screen.controller.result())
                {
                    draw_summary(
                        f,
                        &format!("Results - {}", quiz.name),
                        result,
                        screen.controller.forward_status(),
                        screen.notice.as_deref(),
                        RESULT_HINTS,
                    );
                }
            }
            AppState::AttemptDetail => {
                if let Some(stored) = &self.viewed_attempt {
                    draw_summary(
                        f,
                        &format!(
                            "{} - {}",
                            stored.summary.quiz_name,
                            format_attempt_date(stored.summary.submitted_at)
                        ),
                        &stored.result,
                        &stored.forward_status,
                        None,
                        STORED_ATTEMPT_HINTS,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;
    use crate::models::{QuestionPayload, QuizPayload};
    use crossbeam_channel::{unbounded, Receiver};
    use std::path::PathBuf;

    fn config(reports_dir: PathBuf) -> AppConfig {
        AppConfig {
            service_url: None,
            api_token: None,
            request_timeout_secs: 10,
            quizzes_dir: PathBuf::from("quizzes"),
            submissions_dir: PathBuf::from("submissions"),
            forward_submissions: true,
            log_file: PathBuf::from("quiz_debug.log"),
            db_path: None,
            reports_dir,
        }
    }

    fn app() -> (App, Receiver<ServiceRequest>) {
        let (tx, rx) = unbounded();
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        let app = App::new(
            config(PathBuf::from("results")),
            "Local: quizzes".to_string(),
            tx,
            Some(conn),
        );
        (app, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn quiz() -> QuizDefinition {
        QuizDefinition::from_payload(
            "geo",
            QuizPayload {
                name: Some("Geography".to_string()),
                duration_seconds: Some(60),
                questions: Some(vec![
                    QuestionPayload {
                        prompt: "Capital of France?".to_string(),
                        options: vec!["Paris".to_string(), "Rome".to_string()],
                        correct_answer: "Paris".to_string(),
                    },
                    QuestionPayload {
                        prompt: "Capital of Italy?".to_string(),
                        options: vec!["Paris".to_string(), "Rome".to_string()],
                        correct_answer: "Rome".to_string(),
                    },
                ]),
            },
        )
        .unwrap()
    }

    fn listing() -> QuizListing {
        QuizListing {
            id: "geo".to_string(),
            name: "Geography".to_string(),
            duration_seconds: Some(60),
            question_count: Some(2),
        }
    }

    fn drain(rx: &Receiver<ServiceRequest>) -> Vec<ServiceRequest> {
        rx.try_iter().collect()
    }

    /// Menu with one listed quiz, then Enter and a successful load.
    fn in_quiz() -> (App, Receiver<ServiceRequest>) {
        let (mut app, rx) = app();
        app.handle_response(ServiceResponse::Listed(Ok(vec![listing()])));
        app.handle_key(key(KeyCode::Enter));
        drain(&rx);
        app.handle_response(ServiceResponse::Loaded {
            generation: app.generation,
            result: Ok(quiz()),
        });
        (app, rx)
    }

    fn submit(app: &mut App) {
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('y')));
    }

    #[test]
    fn test_new_requests_quiz_list() {
        let (_app, rx) = app();
        assert!(matches!(drain(&rx).as_slice(), [ServiceRequest::List]));
    }

    #[test]
    fn test_enter_requests_load() {
        let (mut app, rx) = app();
        app.handle_response(ServiceResponse::Listed(Ok(vec![listing()])));
        drain(&rx);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state(), &AppState::Loading);
        match drain(&rx).as_slice() {
            [ServiceRequest::Load {
                generation,
                quiz_id,
            }] => {
                assert_eq!(*generation, 1);
                assert_eq!(quiz_id, "geo");
            }
            other => panic!("unexpected requests: {:?}", other),
        }
    }

    #[test]
    fn test_loaded_opens_attempt() {
        let (app, _rx) = in_quiz();
        assert_eq!(app.state(), &AppState::Quiz);
        let screen = app.screen.as_ref().unwrap();
        assert!(screen.controller.is_in_progress());
        assert_eq!(screen.controller.timer().remaining(), 60);
    }

    #[test]
    fn test_cancelled_load_ignores_late_response() {
        let (mut app, _rx) = app();
        app.handle_response(ServiceResponse::Listed(Ok(vec![listing()])));
        app.handle_key(key(KeyCode::Enter));
        let stale = app.generation;
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state(), &AppState::Menu);

        app.handle_response(ServiceResponse::Loaded {
            generation: stale,
            result: Ok(quiz()),
        });
        assert_eq!(app.state(), &AppState::Menu);
        assert!(app.screen.is_none());
    }

    #[test]
    fn test_load_error_returns_to_menu_with_notice() {
        let (mut app, _rx) = app();
        app.handle_response(ServiceResponse::Listed(Ok(vec![listing()])));
        app.handle_key(key(KeyCode::Enter));
        app.handle_response(ServiceResponse::Loaded {
            generation: app.generation,
            result: Err(LoadError::Incomplete("missing duration".to_string())),
        });
        assert_eq!(app.state(), &AppState::Menu);
        assert!(app.notice.as_deref().unwrap().contains("missing duration"));
    }

    #[test]
    fn test_listing_error_is_shown() {
        let (mut app, _rx) = app();
        app.handle_response(ServiceResponse::Listed(Err(ServiceError::NotFound(
            "quizzes".to_string(),
        ))));
        assert!(app.quizzes_error.is_some());
    }

    #[test]
    fn test_submit_records_attempt_and_forwards_once() {
        let (mut app, rx) = in_quiz();
        app.handle_key(key(KeyCode::Enter));
        submit(&mut app);
        app.handle_key(key(KeyCode::Char('y')));

        assert_eq!(app.state(), &AppState::Summary);
        let requests = drain(&rx);
        let submits: Vec<_> = requests
            .iter()
            .filter(|r| matches!(r, ServiceRequest::Submit { .. }))
            .collect();
        assert_eq!(submits.len(), 1);

        assert_eq!(app.attempts.len(), 1);
        assert_eq!(app.attempts[0].score, 1);
        assert_eq!(app.attempts[0].forward_status, "pending");
    }

    #[test]
    fn test_forward_outcome_updates_history() {
        let (mut app, _rx) = in_quiz();
        submit(&mut app);
        let generation = app.screen.as_ref().unwrap().generation;

        app.handle_response(ServiceResponse::Forwarded {
            generation,
            result: Ok(SubmitReceipt { accepted: true }),
        });

        let screen = app.screen.as_ref().unwrap();
        assert_eq!(
            screen.controller.forward_status(),
            &crate::models::ForwardStatus::Accepted
        );
        assert_eq!(app.attempts[0].forward_status, "accepted");
    }

    #[test]
    fn test_forward_outcome_after_leaving_summary() {
        let (mut app, _rx) = in_quiz();
        submit(&mut app);
        let generation = app.screen.as_ref().unwrap().generation;
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.state(), &AppState::Menu);

        app.handle_response(ServiceResponse::Forwarded {
            generation,
            result: Err(SubmissionForwardError::Rejected),
        });
        assert_eq!(app.attempts[0].forward_status, "rejected");
    }

    #[test]
    fn test_retake_loads_quiz_again() {
        let (mut app, rx) = in_quiz();
        app.handle_key(key(KeyCode::Enter));
        submit(&mut app);
        let first_generation = app.screen.as_ref().unwrap().generation;
        drain(&rx);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state(), &AppState::Loading);
        assert!(matches!(
            drain(&rx).as_slice(),
            [ServiceRequest::Load { quiz_id, .. }] if quiz_id == "geo"
        ));

        app.handle_response(ServiceResponse::Loaded {
            generation: app.generation,
            result: Ok(quiz()),
        });
        assert_eq!(app.state(), &AppState::Quiz);
        let screen = app.screen.as_ref().unwrap();
        assert!(screen.controller.is_in_progress());
        assert!(screen.controller.answers().is_empty());
        assert!(screen.generation > first_generation);
    }

    /// Submits one answered attempt and returns to the history panel.
    fn with_history() -> (App, Receiver<ServiceRequest>) {
        let (mut app, rx) = in_quiz();
        app.handle_key(key(KeyCode::Enter));
        submit(&mut app);
        app.handle_key(key(KeyCode::Char('m')));
        app.handle_key(key(KeyCode::Char('2')));
        drain(&rx);
        (app, rx)
    }

    #[test]
    fn test_history_enter_shows_stored_answers() {
        let (mut app, rx) = with_history();
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state(), &AppState::AttemptDetail);
        assert!(drain(&rx).is_empty());
        let stored = app.viewed_attempt.as_ref().unwrap();
        assert_eq!(stored.summary.quiz_id, "geo");
        assert_eq!(stored.result.score, 1);
        assert_eq!(stored.result.total, 2);
        assert_eq!(stored.result.outcomes.len(), 2);
        assert_eq!(stored.result.outcomes[0].selected.as_deref(), Some("Paris"));
        assert!(stored.result.outcomes[0].is_correct);
        assert!(stored.result.outcomes[1].selected.is_none());
        assert_eq!(stored.forward_status, ForwardStatus::Pending);

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state(), &AppState::Menu);
        assert!(app.viewed_attempt.is_none());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_stored_attempt_retake_loads_quiz() {
        let (mut app, rx) = with_history();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('r')));

        assert_eq!(app.state(), &AppState::Loading);
        assert!(matches!(
            drain(&rx).as_slice(),
            [ServiceRequest::Load { quiz_id, .. }] if quiz_id == "geo"
        ));
    }

    #[test]
    fn test_deleted_attempt_cannot_be_opened() {
        let (mut app, _rx) = with_history();
        let id = app.attempts[0].id;
        attempt::delete_attempt(app.db.as_mut().unwrap(), id).unwrap();

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state(), &AppState::Menu);
        assert!(app.notice.as_deref().unwrap().contains("no longer exists"));
        assert!(app.attempts.is_empty());
    }

    #[test]
    fn test_quit_confirmation() {
        let (mut app, _rx) = in_quiz();
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state(), &AppState::QuizQuitConfirm);
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.state(), &AppState::Quiz);

        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.state(), &AppState::Menu);
        assert!(app.screen.is_none());
        assert!(app.attempts.is_empty());
    }

    #[test]
    fn test_delete_attempt_from_history() {
        let (mut app, _rx) = in_quiz();
        submit(&mut app);
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.attempts.len(), 1);

        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.state(), &AppState::MenuDeleteConfirm);
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.state(), &AppState::Menu);
        assert!(app.attempts.is_empty());
    }

    #[test]
    fn test_export_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = in_quiz();
        app.config.reports_dir = dir.path().to_path_buf();
        submit(&mut app);

        app.handle_key(key(KeyCode::Char('e')));
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let notice = app.screen.as_ref().unwrap().notice.clone().unwrap();
        assert!(notice.starts_with("Saved"));
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut app, _rx) = in_quiz();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_works_without_history_database() {
        let (tx, rx) = unbounded();
        let mut app = App::new(config(PathBuf::from("results")), String::new(), tx, None);
        app.handle_response(ServiceResponse::Listed(Ok(vec![listing()])));
        app.handle_key(key(KeyCode::Enter));
        app.handle_response(ServiceResponse::Loaded {
            generation: app.generation,
            result: Ok(quiz()),
        });
        submit(&mut app);
        assert_eq!(app.state(), &AppState::Summary);
        assert!(drain(&rx)
            .iter()
            .any(|r| matches!(r, ServiceRequest::Submit { .. })));
    }
}
