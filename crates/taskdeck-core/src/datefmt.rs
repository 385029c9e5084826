//! Token-based timestamp formatting.
//!
//! Patterns use the tokens `yyyy MM dd HH mm ss fff`. The first occurrence of
//! each token is replaced by its zero-padded value; any other text, including
//! a repeated token, is copied through.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};

/// Pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "dd/MM/yyyy";

/// Pattern used for task listings.
pub const LISTING_PATTERN: &str = "dd/MM/yyyy HH:mm:ss";

/// Format `timestamp` in its own time zone.
pub fn format_date<Tz: TimeZone>(timestamp: &DateTime<Tz>, pattern: &str) -> String {
    let tokens = [
        ("yyyy", format!("{:04}", timestamp.year())),
        ("MM", format!("{:02}", timestamp.month())),
        ("dd", format!("{:02}", timestamp.day())),
        ("HH", format!("{:02}", timestamp.hour())),
        ("mm", format!("{:02}", timestamp.minute())),
        ("ss", format!("{:02}", timestamp.second())),
        ("fff", format!("{:03}", timestamp.timestamp_subsec_millis() % 1000)),
    ];

    tokens
        .iter()
        .fold(pattern.to_string(), |out, (token, value)| {
            out.replacen(token, value, 1)
        })
}

/// Format a stored UTC timestamp in the local time zone.
pub fn format_local(timestamp: &DateTime<Utc>, pattern: &str) -> String {
    format_date(&timestamp.with_timezone(&Local), pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn sample() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_milli_opt(4, 5, 9, 42)
            .unwrap()
            .and_utc()
    }

    #[rstest]
    #[case(DEFAULT_PATTERN, "07/03/2025")]
    #[case(LISTING_PATTERN, "07/03/2025 04:05:09")]
    #[case("yyyy-MM-dd HH:mm:ss.fff", "2025-03-07 04:05:09.042")]
    #[case("HH:mm", "04:05")]
    #[case("no tokens here", "no tokens here")]
    #[case("dd dd", "07 dd")]
    #[case("", "")]
    fn test_format_date(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(format_date(&sample(), pattern), expected);
    }

    #[test]
    fn test_leap_second_millis_are_clamped() {
        let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 1_500)
            .unwrap()
            .and_utc();
        assert_eq!(format_date(&leap, "fff"), "500");
    }
}
