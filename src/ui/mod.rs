pub mod history;
pub mod layout;
mod menu;
mod quiz;
mod summary;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

pub use history::{format_attempt_date, format_attempt_item};
pub use layout::{calculate_quiz_chunks, calculate_summary_chunks, centered_rect};
pub use menu::{draw_delete_confirmation, draw_menu, MenuView};
pub use quiz::{draw_loading, draw_quit_confirmation, draw_quiz, draw_submit_confirmation};
pub use summary::{draw_summary, RESULT_HINTS, STORED_ATTEMPT_HINTS};

/// Key name followed by what it does, as used in the help bars.
pub(crate) fn key_hint<'a>(key: &'a str, action: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(
            key,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(action),
    ]
}
