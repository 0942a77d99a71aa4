// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z` suffix.
///
/// The fixed width keeps lexicographic order equal to chronological order,
/// which the history query relies on.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a duration in seconds as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Format an RFC3339 timestamp as a long calendar date, e.g. "January 15, 2024".
///
/// Returns `None` if the input does not parse.
pub fn format_date(rfc3339: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(rfc3339)
        .ok()
        .map(|date| date.with_timezone(&Utc).format("%B %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(59), "00:59");
        assert_eq!(format_duration(61), "01:01");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "01:00:00");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(36_000 + 5), "10:00:05");
    }

    #[test]
    fn test_format_utc_rfc3339_uses_millis_and_z() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date("2024-01-15T10:30:00.000Z").as_deref(),
            Some("January 15, 2024")
        );
        assert_eq!(format_date("not a date"), None);
    }
}
