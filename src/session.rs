use crate::controller::QuizSessionController;
use crate::models::{AppState, ForwardRequest, QuizDefinition, SessionState};
use crate::timer::Ticker;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, warn};

/// One attempt as shown on screen: the controller plus cursor and ticker.
#[derive(Debug)]
pub struct QuizScreen {
    pub controller: QuizSessionController,
    /// Index into the options of the visible page, flattened.
    pub cursor: usize,
    /// Load generation this attempt belongs to.
    pub generation: u64,
    pub attempt_id: Option<u64>,
    pub notice: Option<String>,
    ticker: Option<Ticker>,
}

impl QuizScreen {
    pub fn new(generation: u64, forward_enabled: bool, quiz: QuizDefinition) -> Self {
        let mut controller = QuizSessionController::new(forward_enabled);
        controller.begin(quiz);
        Self {
            controller,
            cursor: 0,
            generation,
            attempt_id: None,
            notice: None,
            ticker: None,
        }
    }

    /// `(question id, option index)` for every option on the visible page.
    pub fn page_entries(&self) -> Vec<(usize, usize)> {
        let (Some(quiz), Some(page)) = (self.controller.quiz(), self.controller.current_page())
        else {
            return Vec::new();
        };
        quiz.page(page)
            .iter()
            .flat_map(|q| (0..q.options.len()).map(move |i| (q.id, i)))
            .collect()
    }

    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    /// Keeps a ticker alive exactly while the attempt is in progress with
    /// the timer running.
    pub fn sync_ticker(&mut self) {
        let wanted = self.controller.is_in_progress() && self.controller.timer().is_running();
        match (wanted, self.ticker.is_some()) {
            (true, false) => self.ticker = Some(Ticker::every_second()),
            (false, true) => {
                debug!("Cancelling ticker");
                self.ticker = None;
            }
            _ => {}
        }
    }

    /// Applies elapsed ticks. Returns the forward request if time ran out.
    pub fn on_tick(&mut self) -> Option<ForwardRequest> {
        let elapsed = self.ticker.as_mut().map_or(0, Ticker::drain);
        let mut forward = None;
        for _ in 0..elapsed {
            forward = self.controller.tick();
            if self.controller.is_submitted() {
                break;
            }
        }
        self.sync_ticker();
        forward
    }

    fn move_cursor_down(&mut self) {
        let len = self.page_entries().len();
        if self.cursor < len.saturating_sub(1) {
            self.cursor += 1;
        }
    }

    fn move_cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn select_under_cursor(&mut self) {
        let entries = self.page_entries();
        let Some(&(question_id, option_index)) = entries.get(self.cursor) else {
            return;
        };
        let option = self
            .controller
            .quiz()
            .and_then(|q| q.question(question_id))
            .and_then(|q| q.options.get(option_index))
            .cloned();
        let Some(option) = option else {
            return;
        };
        if let Err(e) = self.controller.select_answer(question_id, &option) {
            warn!("Ignoring selection: {}", e);
        }
    }
}

/// Handles a key while an attempt is open. Returns the forward request when
/// the key submitted the attempt.
pub fn handle_quiz_input(
    screen: &mut QuizScreen,
    key: KeyEvent,
    app_state: &mut AppState,
) -> Option<ForwardRequest> {
    let forward = match screen.controller.state() {
        SessionState::InProgress { .. } => {
            match key.code {
                KeyCode::Esc => *app_state = AppState::QuizQuitConfirm,
                KeyCode::Down | KeyCode::Char('j') => screen.move_cursor_down(),
                KeyCode::Up | KeyCode::Char('k') => screen.move_cursor_up(),
                KeyCode::Enter | KeyCode::Char(' ') => screen.select_under_cursor(),
                KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => {
                    let before = screen.controller.current_page();
                    screen.controller.advance_page();
                    if screen.controller.current_page() != before {
                        screen.cursor = 0;
                    }
                }
                KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => {
                    let before = screen.controller.current_page();
                    screen.controller.retreat_page();
                    if screen.controller.current_page() != before {
                        screen.cursor = 0;
                    }
                }
                KeyCode::Char('s') => {
                    screen.controller.request_submit();
                }
                _ => {}
            }
            None
        }
        SessionState::ConfirmingSubmission { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => screen.controller.confirm_submit(),
            KeyCode::Char('n') | KeyCode::Esc => {
                screen.controller.cancel_submit();
                None
            }
            _ => None,
        },
        SessionState::NotStarted | SessionState::Submitted(_) => None,
    };

    screen.sync_ticker();
    if screen.controller.is_submitted() {
        *app_state = AppState::Summary;
    }
    forward
}
