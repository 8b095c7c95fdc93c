//! Parsing helpers for days and appointment times supplied as strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::SlotError;

/// Parse a calendar day (`YYYY-MM-DD`). Any time-of-day part of an RFC 3339
/// or naive datetime is accepted and discarded.
pub fn parse_day(s: &str) -> Result<NaiveDate, SlotError> {
    let trimmed = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }
    parse_datetime(trimmed)
        .map(|dt| dt.date())
        .map_err(|_| SlotError::InvalidDatetime(format!("'{}' is not a day", s)))
}

/// Parse an appointment time.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]`, the same with a space separator, or an
/// RFC 3339 string with offset. Offsets are dropped, keeping the written
/// wall-clock time; stored-time shifts are the job of
/// [`StorageOffset`](crate::StorageOffset).
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, SlotError> {
    let trimmed = s.trim();
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_local())
        .map_err(|e| SlotError::InvalidDatetime(format!("'{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_plain() {
        assert_eq!(
            parse_day("2026-03-16").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
        );
    }

    #[test]
    fn test_parse_day_discards_time() {
        assert_eq!(
            parse_day("2026-03-16T14:30:00+02:00").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
        );
    }

    #[test]
    fn test_parse_day_invalid() {
        let err = parse_day("16/03/2026").unwrap_err().to_string();
        assert!(err.contains("Invalid datetime"), "got: {err}");
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(9, 20, 0)
            .unwrap();
        for s in [
            "2026-03-16T09:20:00",
            "2026-03-16T09:20",
            "2026-03-16 09:20",
            "2026-03-16T09:20:00Z",
            "2026-03-16T09:20:00+02:00",
        ] {
            assert_eq!(parse_datetime(s).unwrap(), expected, "input: {s}");
        }
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("nine o'clock").is_err());
        assert!(parse_datetime("2026-03-16T25:00").is_err());
    }
}
