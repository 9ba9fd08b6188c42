use crate::models::{QuestionPayload, QuizPayload};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const OPTION_SEPARATOR: char = '|';

fn directive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#\s*(name|duration)\s*[:=]\s*(.+?)\s*$").expect("directive regex is valid")
    })
}

/// Quiz files (`.csv` and `.json`) in `dir`, sorted by path.
pub fn get_quiz_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if dir.is_dir()
        && let Ok(entries) = fs::read_dir(dir)
    {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(ext) = path.extension()
                && (ext == "csv" || ext == "json")
            {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Parses a quiz in CSV form:
///
/// ```text
/// # name: Networks
/// # duration: 600
/// "What does ARP resolve?","IP to MAC|MAC to IP|Name to IP","IP to MAC"
/// ```
///
/// Lines starting with `#` that are not directives are comments. Rows with
/// fewer than three fields or an empty prompt are skipped. A missing
/// duration stays `None` so the loader can report the quiz as incomplete.
pub fn parse_quiz_csv(content: &str) -> Result<QuizPayload, String> {
    let mut payload = QuizPayload::default();
    let mut questions = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            if let Some(caps) = directive_re().captures(trimmed) {
                let value = caps[2].to_string();
                match &caps[1] {
                    "name" => payload.name = Some(value),
                    _ => {
                        let seconds = value.parse::<u64>().map_err(|_| {
                            format!("line {}: invalid duration {:?}", line_no + 1, value)
                        })?;
                        payload.duration_seconds = Some(seconds);
                    }
                }
            }
            continue;
        }

        let fields = parse_csv_line(line);
        if fields.len() < 3 || fields[0].trim().is_empty() {
            continue;
        }
        let options: Vec<String> = fields[1]
            .split(OPTION_SEPARATOR)
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        questions.push(QuestionPayload {
            prompt: fields[0].trim().to_string(),
            options,
            correct_answer: fields[2].trim().to_string(),
        });
    }

    payload.questions = Some(questions);
    Ok(payload)
}

/// Splits one CSV line into fields. Quoted fields may contain commas and
/// doubled quotes.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut chars = line.chars().peekable();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => {
                current.push(c);
            }
        }
    }
    fields.push(current);

    fields
}
