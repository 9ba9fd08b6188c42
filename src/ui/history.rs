use crate::db::attempt::AttemptSummary;
use crate::models::EndedBy;
use std::time::{Duration, UNIX_EPOCH};

const DATE_FORMAT_TODAY: &str = "Today %H:%M";
const DATE_FORMAT_YESTERDAY: &str = "Yesterday %H:%M";
const DATE_FORMAT_OTHER: &str = "%Y-%m-%d";

pub fn format_attempt_date(timestamp: u64) -> String {
    let attempt_time = UNIX_EPOCH + Duration::from_secs(timestamp);
    let datetime: chrono::DateTime<chrono::Local> = attempt_time.into();

    let today = chrono::Local::now();
    let attempt_date = datetime.date_naive();

    if attempt_date == today.date_naive() {
        datetime.format(DATE_FORMAT_TODAY).to_string()
    } else if attempt_date == today.date_naive() - chrono::Duration::days(1) {
        datetime.format(DATE_FORMAT_YESTERDAY).to_string()
    } else {
        datetime.format(DATE_FORMAT_OTHER).to_string()
    }
}

pub fn format_attempt_item(attempt: &AttemptSummary) -> String {
    let timeout = match attempt.ended_by {
        EndedBy::Timeout => ", timed out",
        EndedBy::Manual => "",
    };
    format!(
        "{} - {} {}/{} ({}%{})",
        format_attempt_date(attempt.submitted_at),
        attempt.quiz_name,
        attempt.score,
        attempt.total,
        attempt.percentage,
        timeout
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(submitted_at: u64, ended_by: EndedBy) -> AttemptSummary {
        AttemptSummary {
            id: 1,
            quiz_id: "geo".to_string(),
            quiz_name: "Geography".to_string(),
            score: 3,
            total: 4,
            percentage: 75,
            ended_by,
            forward_status: "accepted".to_string(),
            submitted_at,
            seconds_remaining: 0,
        }
    }

    #[test]
    fn test_format_attempt_date_today() {
        let now = chrono::Local::now().timestamp() as u64;
        assert!(format_attempt_date(now).starts_with("Today "));
    }

    #[test]
    fn test_format_attempt_date_old() {
        assert_eq!(format_attempt_date(0).len(), 10);
    }

    #[test]
    fn test_format_attempt_item() {
        let now = chrono::Local::now().timestamp() as u64;
        let item = format_attempt_item(&attempt(now, EndedBy::Timeout));
        assert!(item.ends_with("Geography 3/4 (75%, timed out)"));
        let item = format_attempt_item(&attempt(now, EndedBy::Manual));
        assert!(item.ends_with("Geography 3/4 (75%)"));
    }
}
