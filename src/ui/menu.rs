use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::history::format_attempt_item;
use super::key_hint;
use super::layout::centered_rect;
use crate::db::attempt::AttemptSummary;
use crate::models::QuizListing;
use crate::timer::format_remaining;

/// Everything the menu screen shows.
pub struct MenuView<'a> {
    pub quizzes: &'a [QuizListing],
    pub quizzes_error: Option<&'a str>,
    pub selected_quiz: usize,
    pub attempts: &'a [AttemptSummary],
    pub history_available: bool,
    pub selected_attempt: usize,
    pub focused_panel: usize,
    pub service_label: &'a str,
    pub notice: Option<&'a str>,
}

fn format_quiz_item(quiz: &QuizListing) -> String {
    let mut details = Vec::new();
    if let Some(count) = quiz.question_count {
        details.push(format!("{} questions", count));
    }
    if let Some(secs) = quiz.duration_seconds {
        details.push(format_remaining(secs));
    }
    if details.is_empty() {
        quiz.name.clone()
    } else {
        format!("{} ({})", quiz.name, details.join(", "))
    }
}

fn panel_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_panel_header(area: Rect, title: &str, focused: bool, f: &mut Frame) {
    let style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    f.render_widget(Paragraph::new(title).style(style), area);
}

fn placeholder(text: &str) -> Vec<ListItem<'_>> {
    vec![ListItem::new(text).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]
}

fn item_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub fn draw_menu(f: &mut Frame, view: &MenuView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(f.area());

    let title = Paragraph::new(format!("Study Quiz v{}", env!("CARGO_PKG_VERSION")))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let quiz_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(chunks[1]);
    let history_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(chunks[2]);

    let quizzes_focused = view.focused_panel == 0;
    draw_panel_header(quiz_chunks[0], "[1] Quizzes", quizzes_focused, f);

    let quiz_items: Vec<ListItem> = if let Some(err) = view.quizzes_error {
        vec![ListItem::new(format!("Could not list quizzes: {}", err))
            .style(Style::default().fg(Color::Red))]
    } else if view.quizzes.is_empty() {
        placeholder("No quizzes found")
    } else {
        view.quizzes
            .iter()
            .enumerate()
            .map(|(i, quiz)| {
                ListItem::new(format_quiz_item(quiz))
                    .style(item_style(quizzes_focused && i == view.selected_quiz))
            })
            .collect()
    };
    let quiz_list = List::new(quiz_items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(panel_style(quizzes_focused)),
    );
    f.render_widget(quiz_list, quiz_chunks[1]);

    let history_focused = view.focused_panel == 1;
    draw_panel_header(history_chunks[0], "[2] History", history_focused, f);

    let attempt_items: Vec<ListItem> = if !view.history_available {
        placeholder("History unavailable")
    } else if view.attempts.is_empty() {
        placeholder("No past attempts")
    } else {
        view.attempts
            .iter()
            .enumerate()
            .map(|(i, attempt)| {
                ListItem::new(format_attempt_item(attempt))
                    .style(item_style(history_focused && i == view.selected_attempt))
            })
            .collect()
    };
    let history_list = List::new(attempt_items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(panel_style(history_focused)),
    );
    f.render_widget(history_list, history_chunks[1]);

    let footer_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[3]);

    let mut status_lines = vec![Line::from(view.service_label.to_string())];
    if let Some(notice) = view.notice {
        status_lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    let status = Paragraph::new(status_lines)
        .style(Style::default().fg(Color::Green))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Source"));
    f.render_widget(status, footer_chunks[0]);

    let mut first = Vec::new();
    first.extend(key_hint("1/2", " Focus  "));
    first.extend(key_hint("↑/↓", " Navigate  "));
    first.extend(key_hint("Enter", " Start/View"));
    let mut second = Vec::new();
    second.extend(key_hint("d", " Delete  "));
    second.extend(key_hint("r", " Refresh  "));
    second.extend(key_hint("Esc/Ctrl+C", " Quit"));

    let help = Paragraph::new(vec![Line::from(first), Line::from(second)])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, footer_chunks[1]);
}

pub fn draw_delete_confirmation(f: &mut Frame, attempt: Option<&AttemptSummary>) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);

    let description = attempt
        .map(format_attempt_item)
        .unwrap_or_else(|| "this attempt".to_string());

    let mut help = vec![Span::styled(
        "y",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];
    help.push(Span::from(" Delete  "));
    help.push(Span::styled(
        "n",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    help.push(Span::from(" Keep"));

    let text = vec![
        Line::from("Delete this attempt from history?"),
        Line::from(""),
        Line::from(description),
        Line::from(""),
        Line::from(help),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title("Delete Attempt"),
        );
    f.render_widget(dialog, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(count: Option<usize>, secs: Option<u64>) -> QuizListing {
        QuizListing {
            id: "geo".to_string(),
            name: "Geography".to_string(),
            duration_seconds: secs,
            question_count: count,
        }
    }

    #[test]
    fn test_format_quiz_item_with_details() {
        assert_eq!(
            format_quiz_item(&listing(Some(4), Some(90))),
            "Geography (4 questions, 01:30)"
        );
    }

    #[test]
    fn test_format_quiz_item_bare() {
        assert_eq!(format_quiz_item(&listing(None, None)), "Geography");
    }
}
