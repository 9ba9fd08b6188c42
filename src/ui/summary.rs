use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::key_hint;
use super::layout::calculate_summary_chunks;
use crate::models::{EndedBy, ForwardStatus, QuizResult};
use crate::timer::format_remaining;
use crate::utils::truncate_string;

fn forward_line(status: &ForwardStatus) -> Line<'static> {
    let (text, color) = match status {
        ForwardStatus::Disabled => ("Not forwarded (disabled)".to_string(), Color::DarkGray),
        ForwardStatus::Pending => ("Sending answers...".to_string(), Color::Yellow),
        ForwardStatus::Accepted => ("Answers sent".to_string(), Color::Green),
        ForwardStatus::Rejected => ("Service rejected the answers".to_string(), Color::Red),
        ForwardStatus::Failed(err) if err.is_empty() => ("Sending failed".to_string(), Color::Red),
        ForwardStatus::Failed(err) => (format!("Sending failed: {}", err), Color::Red),
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}

/// Footer keys of a freshly submitted attempt.
pub const RESULT_HINTS: &[(&str, &str)] = &[
    ("e", " Export  "),
    ("r", " Retake  "),
    ("m", " Main Menu  "),
    ("Esc", " Quit"),
];

/// Footer keys of an attempt opened from history.
pub const STORED_ATTEMPT_HINTS: &[(&str, &str)] = &[("r", " Retake  "), ("m/Esc", " Back to Menu")];

pub fn draw_summary(
    f: &mut Frame,
    title: &str,
    result: &QuizResult,
    forward_status: &ForwardStatus,
    notice: Option<&str>,
    hints: &[(&str, &str)],
) {
    let layout = calculate_summary_chunks(f.area());

    let title = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    let ended = match result.ended_by {
        EndedBy::Manual => format!(
            "Submitted with {} left",
            format_remaining(result.seconds_remaining)
        ),
        EndedBy::Timeout => "Time ran out".to_string(),
    };
    let score_color = if result.percentage >= 50 {
        Color::Green
    } else {
        Color::Red
    };
    let score = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(
                "Score: {} / {} ({}%)",
                result.score, result.total, result.percentage
            ),
            Style::default().fg(score_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(ended),
        forward_line(forward_status),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(score, layout.score_area);

    let mut details = Text::default();
    for outcome in &result.outcomes {
        let (mark, color) = if outcome.is_correct {
            ("[✓]", Color::Green)
        } else {
            ("[✗]", Color::Red)
        };
        details.push_line(Line::from(vec![
            Span::styled(mark, Style::default().fg(color)),
            Span::from(format!(
                " {}. {}",
                outcome.question_id,
                truncate_string(&outcome.prompt, 60)
            )),
        ]));
        details.push_line(Line::from(format!(
            "    Your answer: {}",
            outcome.selected.as_deref().unwrap_or("(unanswered)")
        )));
        if !outcome.is_correct {
            details.push_line(Line::from(format!(
                "    Correct answer: {}",
                outcome.correct_answer
            )));
        }
    }
    let content = Paragraph::new(details)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Answers"));
    f.render_widget(content, layout.content_area);

    let help: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| key_hint(key, action))
        .collect();
    let mut lines = vec![Line::from(help)];
    if let Some(notice) = notice {
        lines.insert(
            0,
            Line::from(Span::styled(notice, Style::default().fg(Color::Yellow))),
        );
    }
    let footer = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, layout.footer_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_line_failed_includes_reason() {
        let line = forward_line(&ForwardStatus::Failed("timeout".to_string()));
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Sending failed: timeout");
    }

    #[test]
    fn test_forward_line_failed_without_reason() {
        let line = forward_line(&ForwardStatus::Failed(String::new()));
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Sending failed");
    }
}
