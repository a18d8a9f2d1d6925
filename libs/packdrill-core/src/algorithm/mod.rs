//! Review scheduling.

pub mod sm2;

pub use sm2::Sm2;

use chrono::{DateTime, Utc};

use crate::types::{CardState, Rating};

/// One non-committed outcome of rating a card, as shown on grading
/// buttons: the state the card would move to and a short label for how
/// far away it would be due.
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub rating: Rating,
    pub state: CardState,
    pub label: String,
}

/// Label for the distance between `now` and `due`: `<Nm` under an hour
/// (nearest minute), `<Nh` under a day (nearest hour), `Nd` otherwise
/// (nearest day).
pub fn due_label(now: DateTime<Utc>, due: DateTime<Utc>) -> String {
    let secs = (due - now).num_seconds().max(0);
    if secs < 3_600 {
        let minutes = ((secs as f64) / 60.0).round().max(1.0) as i64;
        format!("<{minutes}m")
    } else if secs < 86_400 {
        let hours = ((secs as f64) / 3_600.0).round() as i64;
        format!("<{hours}h")
    } else {
        let days = ((secs as f64) / 86_400.0).round() as i64;
        format!("{days}d")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn labels_scale_with_distance() {
        let now = Utc::now();
        assert_eq!(due_label(now, now + Duration::minutes(1)), "<1m");
        assert_eq!(due_label(now, now + Duration::minutes(10)), "<10m");
        assert_eq!(due_label(now, now + Duration::hours(6)), "<6h");
        assert_eq!(due_label(now, now + Duration::days(4)), "4d");
        assert_eq!(due_label(now, now + Duration::days(30)), "30d");
    }

    #[test]
    fn past_due_floors_at_one_minute() {
        let now = Utc::now();
        assert_eq!(due_label(now, now - Duration::hours(2)), "<1m");
    }
}
