use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::key_hint;
use super::layout::{calculate_quiz_chunks, centered_rect};
use crate::models::{Question, SubmitSummary};
use crate::session::QuizScreen;
use crate::timer::format_remaining;
use crate::utils::option_label;

fn timer_style(remaining: u64, budget: u64) -> Style {
    let color = if remaining <= 10 || remaining <= budget / 10 {
        Color::Red
    } else if remaining <= budget / 4 {
        Color::Yellow
    } else {
        Color::Green
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Prompt followed by the options, marking the chosen one and the one
/// under the cursor. `cursor` is relative to this question's options.
fn question_text<'a>(question: &'a Question, selected: Option<&str>, cursor: Option<usize>) -> Text<'a> {
    let mut text = Text::default();
    text.push_line(Line::from(Span::styled(
        question.prompt.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    text.push_line(Line::from(""));

    for (i, option) in question.options.iter().enumerate() {
        let chosen = selected == Some(option.as_str());
        let marker = if chosen { "(*)" } else { "( )" };
        let pointer = if cursor == Some(i) { ">" } else { " " };

        let mut style = Style::default();
        if chosen {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        if cursor == Some(i) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        text.push_line(Line::from(Span::styled(
            format!("{} {} {}. {}", pointer, marker, option_label(i), option),
            style,
        )));
    }
    text
}

pub fn draw_quiz(f: &mut Frame, screen: &QuizScreen) {
    let controller = &screen.controller;
    let Some(quiz) = controller.quiz() else {
        return;
    };
    let page = controller.current_page().unwrap_or(1);
    let layout = calculate_quiz_chunks(f.area());

    let timer = controller.timer();
    let header_line = Line::from(vec![
        Span::styled(
            format!(
                "{} - Page {} / {} - Answered {} / {}  ",
                quiz.name,
                page,
                controller.page_count(),
                controller.answers().len(),
                quiz.questions.len()
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format_remaining(timer.remaining()),
            timer_style(timer.remaining(), timer.budget()),
        ),
        Span::from(if timer.is_running() {
            ""
        } else if timer.remaining() == timer.budget() {
            " (starts on first answer)"
        } else {
            " (paused)"
        }),
    ]);
    let header = Paragraph::new(header_line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let mut offset = 0;
    for (question, area) in quiz.page(page).iter().zip(layout.question_areas.iter()) {
        let len = question.options.len();
        let cursor = (screen.cursor >= offset && screen.cursor < offset + len)
            .then(|| screen.cursor - offset);
        offset += len;

        let body = Paragraph::new(question_text(
            question,
            controller.answers().get(question.id),
            cursor,
        ))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if cursor.is_some() {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                })
                .title(format!("Question {}", question.id)),
        );
        f.render_widget(body, *area);
    }

    let mut first = Vec::new();
    first.extend(key_hint("↑/↓", " Move  "));
    first.extend(key_hint("Enter/Space", " Choose  "));
    first.extend(key_hint("←/→", " Page"));
    let mut second = Vec::new();
    second.extend(key_hint("s", " Submit  "));
    second.extend(key_hint("Esc", " Quit to Menu  "));
    second.extend(key_hint("Ctrl+C", " Exit App"));

    let mut lines = vec![Line::from(first), Line::from(second)];
    if let Some(notice) = &screen.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        )));
    }
    let help = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

pub fn draw_submit_confirmation(f: &mut Frame, summary: &SubmitSummary) {
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);

    let unanswered = summary.total - summary.answered.min(summary.total);
    let mut text = vec![
        Line::from(format!(
            "Answered {} of {} questions.",
            summary.answered, summary.total
        )),
        Line::from(format!(
            "Time left: {}",
            format_remaining(summary.seconds_remaining)
        )),
    ];
    if unanswered > 0 {
        text.push(Line::from(Span::styled(
            format!("{} unanswered will count as wrong.", unanswered),
            Style::default().fg(Color::Yellow),
        )));
    }
    text.push(Line::from(""));
    text.push(Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Submit  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" Keep Going"),
    ]));

    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title("Submit Answers?"),
        );
    f.render_widget(dialog, area);
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Quit to Menu")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("Leave this attempt? Your answers will be discarded.")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Yes (Return to Menu)  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" No (Continue Quiz)  "),
        Span::styled(
            "Ctrl+C",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Exit App"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn draw_loading(f: &mut Frame, quiz_name: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let mut hint = Vec::new();
    hint.extend(key_hint("Esc", " Cancel"));
    let text = vec![
        Line::from(format!("Loading {}...", quiz_name)),
        Line::from(""),
        Line::from(hint),
    ];
    let loading = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Loading"));
    f.render_widget(loading, area);
}
