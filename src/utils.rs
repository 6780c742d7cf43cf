//! Small helpers shared across the pipeline.

use chrono::{Local, NaiveDate};

/// Today's calendar date in the local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The date portion of an aggregator timestamp (`"2018-08-21 10:00:00"`).
///
/// Returns the first whitespace-separated token, or `None` for blank input.
pub fn date_part(timestamp: &str) -> Option<&str> {
    timestamp.split_whitespace().next()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with a
/// `"…(+N bytes)"` suffix.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2018-08-21 10:00:00"), Some("2018-08-21"));
        assert_eq!(date_part("2018-08-21"), Some("2018-08-21"));
        assert_eq!(date_part("   "), None);
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // Each of these characters is three bytes long.
        let result = truncate_for_log("西安教育", 4);
        assert_eq!(result, "西…(+9 bytes)");
    }
}
