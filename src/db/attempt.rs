use crate::models::{EndedBy, ForwardStatus, QuestionOutcome, QuizDefinition, QuizResult};
use rusqlite::{Connection, Result};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct AttemptSummary {
    pub id: u64,
    pub quiz_id: String,
    pub quiz_name: String,
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub ended_by: EndedBy,
    pub forward_status: String,
    pub submitted_at: u64,
    pub seconds_remaining: u64,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Stores a submitted attempt with one row per question.
pub fn record_attempt(
    conn: &mut Connection,
    quiz: &QuizDefinition,
    result: &QuizResult,
    forward_status: &ForwardStatus,
) -> Result<u64> {
    let ts = now();
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO attempts (quiz_id, quiz_name, score, total, percentage, ended_by,
             duration_seconds, seconds_remaining, forward_status, submitted_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            quiz.id,
            quiz.name,
            result.score,
            result.total,
            result.percentage,
            result.ended_by.as_str(),
            quiz.duration_seconds,
            result.seconds_remaining,
            forward_status.as_str(),
            ts,
            ts,
            ts
        ],
    )?;
    let attempt_id = tx.last_insert_rowid() as u64;

    for outcome in &result.outcomes {
        tx.execute(
            "INSERT INTO attempt_answers (attempt_id, question_id, prompt, selected, correct_answer, is_correct)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                attempt_id,
                outcome.question_id,
                outcome.prompt,
                outcome.selected,
                outcome.correct_answer,
                outcome.is_correct
            ],
        )?;
    }

    tx.commit()?;
    Ok(attempt_id)
}

pub fn update_forward_status(
    conn: &Connection,
    attempt_id: u64,
    forward_status: &ForwardStatus,
) -> Result<()> {
    conn.execute(
        "UPDATE attempts SET forward_status = ?, updated_at = ? WHERE id = ?",
        rusqlite::params![forward_status.as_str(), now(), attempt_id],
    )?;
    Ok(())
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> Result<AttemptSummary> {
    let ended_by: String = row.get(6)?;
    Ok(AttemptSummary {
        id: row.get(0)?,
        quiz_id: row.get(1)?,
        quiz_name: row.get(2)?,
        score: row.get(3)?,
        total: row.get(4)?,
        percentage: row.get(5)?,
        ended_by: EndedBy::parse(&ended_by),
        forward_status: row.get(7)?,
        submitted_at: row.get(8)?,
        seconds_remaining: row.get(9)?,
    })
}

const SUMMARY_COLUMNS: &str = "id, quiz_id, quiz_name, score, total, percentage, ended_by, forward_status, submitted_at, seconds_remaining";

pub fn get_attempt(conn: &Connection, id: u64) -> Result<Option<AttemptSummary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM attempts WHERE id = ?",
        SUMMARY_COLUMNS
    ))?;

    match stmt.query_row([id], summary_from_row) {
        Ok(summary) => Ok(Some(summary)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Most recent attempts first.
pub fn list_recent_attempts(conn: &Connection, limit: usize) -> Result<Vec<AttemptSummary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM attempts ORDER BY submitted_at DESC, id DESC LIMIT ?",
        SUMMARY_COLUMNS
    ))?;

    let attempts = stmt
        .query_map([limit], summary_from_row)?
        .filter_map(|r| r.ok())
        .collect();

    Ok(attempts)
}

pub fn load_attempt_answers(conn: &Connection, attempt_id: u64) -> Result<Vec<QuestionOutcome>> {
    let mut stmt = conn.prepare(
        "SELECT question_id, prompt, selected, correct_answer, is_correct
         FROM attempt_answers WHERE attempt_id = ? ORDER BY question_id",
    )?;

    let outcomes = stmt
        .query_map([attempt_id], |row| {
            Ok(QuestionOutcome {
                question_id: row.get(0)?,
                prompt: row.get(1)?,
                selected: row.get(2)?,
                correct_answer: row.get(3)?,
                is_correct: row.get(4)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(outcomes)
}

pub fn delete_attempt(conn: &mut Connection, attempt_id: u64) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM attempt_answers WHERE attempt_id = ?",
        [attempt_id],
    )?;
    tx.execute("DELETE FROM attempts WHERE id = ?", [attempt_id])?;
    tx.commit()
}
