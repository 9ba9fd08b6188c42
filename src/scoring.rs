use crate::models::{AnswerSet, EndedBy, QuestionOutcome, QuizDefinition, QuizResult};

/// Exact string match per question; unanswered questions count as wrong.
pub fn score(
    quiz: &QuizDefinition,
    answers: &AnswerSet,
    ended_by: EndedBy,
    seconds_remaining: u64,
) -> QuizResult {
    let outcomes: Vec<QuestionOutcome> = quiz
        .questions
        .iter()
        .map(|question| {
            let selected = answers.get(question.id).map(str::to_string);
            let is_correct = selected.as_deref() == Some(question.correct_answer.as_str());
            QuestionOutcome {
                question_id: question.id,
                prompt: question.prompt.clone(),
                selected,
                correct_answer: question.correct_answer.clone(),
                is_correct,
            }
        })
        .collect();

    let score = outcomes.iter().filter(|o| o.is_correct).count();
    let total = outcomes.len();

    QuizResult {
        score,
        total,
        percentage: percentage(score, total),
        ended_by,
        seconds_remaining,
        outcomes,
    }
}

/// `round(100 * score / total)`, rounding halves away from zero.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * score as f64 / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionPayload, QuizPayload};

    fn quiz(correct: &[&str]) -> QuizDefinition {
        QuizDefinition::from_payload(
            "q",
            QuizPayload {
                name: None,
                duration_seconds: Some(60),
                questions: Some(
                    correct
                        .iter()
                        .map(|c| QuestionPayload {
                            prompt: "?".to_string(),
                            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                            correct_answer: c.to_string(),
                        })
                        .collect(),
                ),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_score_partial_answers() {
        let answers: AnswerSet = [(1, "B"), (2, "D"), (3, "A")].into_iter().collect();
        let result = score(&quiz(&["B", "D", "D", "D"]), &answers, EndedBy::Manual, 10);
        assert_eq!(result.score, 2);
        assert_eq!(result.total, 4);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.seconds_remaining, 10);
    }

    #[test]
    fn test_score_is_exact_match() {
        let answers: AnswerSet = [(1, "b"), (2, "B ")].into_iter().collect();
        let result = score(&quiz(&["B", "B"]), &answers, EndedBy::Manual, 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let q = quiz(&["A", "B", "C"]);
        let answers: AnswerSet = [(1, "A"), (3, "C")].into_iter().collect();
        let first = score(&q, &answers, EndedBy::Timeout, 0);
        let second = score(&q, &answers, EndedBy::Timeout, 0);
        assert_eq!(first, second);
        assert_eq!(first.percentage, 67);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
    }
}
