use crate::models::{EndedBy, ForwardStatus, QuizDefinition, QuizResult};
use crate::timer::format_remaining;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn render_report(
    quiz: &QuizDefinition,
    result: &QuizResult,
    forward_status: &ForwardStatus,
    submitted_at: &chrono::DateTime<chrono::Local>,
) -> String {
    let mut out = String::new();
    let ended = match result.ended_by {
        EndedBy::Manual => "submitted",
        EndedBy::Timeout => "time ran out",
    };

    let _ = writeln!(out, "# {}", quiz.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "- Date: {}", submitted_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(
        out,
        "- Score: {}/{} ({}%)",
        result.score, result.total, result.percentage
    );
    let _ = writeln!(
        out,
        "- Ended: {} with {} of {} left",
        ended,
        format_remaining(result.seconds_remaining),
        format_remaining(quiz.duration_seconds)
    );
    let _ = writeln!(out, "- Forwarded: {}", forward_status.as_str());
    let _ = writeln!(out);

    for outcome in &result.outcomes {
        let mark = if outcome.is_correct { "x" } else { " " };
        let _ = writeln!(out, "## [{}] Q{}. {}", mark, outcome.question_id, outcome.prompt);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Your answer: {}",
            outcome.selected.as_deref().unwrap_or("(unanswered)")
        );
        if !outcome.is_correct {
            let _ = writeln!(out, "Correct answer: {}", outcome.correct_answer);
        }
        let _ = writeln!(out);
    }

    out
}

/// Writes the report to `dir`, creating it if needed, and returns the path.
pub fn write_result_report(
    dir: &Path,
    quiz: &QuizDefinition,
    result: &QuizResult,
    forward_status: &ForwardStatus,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let now = chrono::Local::now();
    let path = dir.join(format!("{}-{}.md", quiz.id, now.format("%Y%m%d-%H%M%S")));
    fs::write(&path, render_report(quiz, result, forward_status, &now))?;
    Ok(path)
}
