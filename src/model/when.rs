//! Lenient timestamp parsing for sort ordering.
//!
//! Sheet timestamps arrive in whatever format the form or the author produced. The sort
//! comparators only need a best-effort instant, so parsing tries a handful of known
//! formats and gives up quietly with `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime formats observed in form-submitted sheets, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Date-only formats, tried after the datetime formats. Midnight is assumed.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parses a cell into a naive timestamp, or `None` when no known format matches.
pub(crate) fn parse(cell: &str) -> Option<NaiveDateTime> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0).unwrap_or_default());
        }
    }
    None
}

/// Milliseconds since the Unix epoch for a parsed cell, with unparseable cells ordered as
/// the epoch itself (oldest).
pub(crate) fn parse_millis_or_zero(cell: &str) -> i64 {
    parse(cell)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_form_timestamp() {
        let dt = parse("1/15/2024 13:45:12").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (1, 15, 13));
    }

    #[test]
    fn test_parse_iso_date() {
        let dt = parse("2024-02-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 2, 1));
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse("2024-02-01T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse("Row 7").is_none());
        assert!(parse("").is_none());
        assert!(parse("yesterday").is_none());
    }

    #[test]
    fn test_millis_ordering() {
        let older = parse_millis_or_zero("2024-01-01");
        let newer = parse_millis_or_zero("2024-02-01");
        assert!(newer > older);
        assert_eq!(parse_millis_or_zero("not a date"), 0);
    }
}
