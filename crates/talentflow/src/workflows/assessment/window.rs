use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Slack added on top of a test's duration when scheduling its window.
pub const DEFAULT_GRACE_MINUTES: u32 = 5;

/// Shortest window that fits the test plus the grace period.
pub fn required_window_minutes(duration_minutes: u32, grace_minutes: u32) -> i64 {
    i64::from(duration_minutes) + i64::from(grace_minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowCheck {
    pub valid: bool,
    pub actual_minutes: i64,
    pub required_minutes: i64,
}

/// Check that `[start, end]` is long enough to sit the test.
///
/// The window must move forward in time and span at least
/// `duration + grace` whole minutes.
pub fn validate_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_minutes: u32,
    grace_minutes: u32,
) -> WindowCheck {
    let required_minutes = required_window_minutes(duration_minutes, grace_minutes);
    let actual_minutes = (end - start).num_minutes();

    WindowCheck {
        valid: end > start && actual_minutes >= required_minutes,
        actual_minutes,
        required_minutes,
    }
}

/// End time offered when only a start time has been picked.
pub fn propose_end(
    start: DateTime<Utc>,
    duration_minutes: u32,
    grace_minutes: u32,
) -> DateTime<Utc> {
    start + Duration::minutes(required_window_minutes(duration_minutes, grace_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 12, hour, minute, 0).unwrap()
    }

    #[test]
    fn sixty_minute_test_needs_sixty_five_minutes() {
        assert_eq!(required_window_minutes(60, DEFAULT_GRACE_MINUTES), 65);

        let short = validate_window(at(10, 0), at(11, 0), 60, DEFAULT_GRACE_MINUTES);
        assert_eq!(
            short,
            WindowCheck {
                valid: false,
                actual_minutes: 60,
                required_minutes: 65,
            }
        );

        let roomy = validate_window(at(10, 0), at(11, 10), 60, DEFAULT_GRACE_MINUTES);
        assert!(roomy.valid);
        assert_eq!(roomy.actual_minutes, 70);
    }

    #[test]
    fn exact_fit_is_valid() {
        assert!(validate_window(at(9, 0), at(10, 5), 60, 5).valid);
        assert!(!validate_window(at(9, 0), at(10, 4), 60, 5).valid);
    }

    #[test]
    fn backwards_or_empty_windows_are_invalid() {
        let backwards = validate_window(at(11, 0), at(10, 0), 0, 0);
        assert!(!backwards.valid);
        assert_eq!(backwards.actual_minutes, -60);

        assert!(!validate_window(at(10, 0), at(10, 0), 0, 0).valid);
    }

    #[test]
    fn proposed_end_is_always_valid() {
        let start = at(14, 30);
        let end = propose_end(start, 45, DEFAULT_GRACE_MINUTES);
        assert_eq!(end, at(15, 20));
        assert!(validate_window(start, end, 45, DEFAULT_GRACE_MINUTES).valid);
    }
}
