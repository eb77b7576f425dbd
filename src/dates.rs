//! Publish-date normalization.
//!
//! The FCV site renders publish dates in a single fixed display format,
//! `DD/MM/YYYY às HhMM` (e.g. `05/03/2024 às 14h30`). This module parses
//! that format and converts it to Unix epoch seconds against an explicit
//! UTC offset, so the resulting timestamps do not depend on the host's
//! timezone configuration.

use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// The site's fixed display format. The hour may be one or two digits.
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{4})\s+às\s+(\d{1,2})h(\d{2})").unwrap());

/// Failure modes of [`normalize`].
#[derive(Debug, Error)]
pub enum DateError {
    /// The string does not match `DD/MM/YYYY às HhMM`.
    #[error("date string `{0}` does not match DD/MM/YYYY às HhMM")]
    Format(String),
    /// A capture group was absent after a successful match. Unreachable with
    /// the current pattern; kept because the contract names it.
    #[error("date string `{0}` matched with empty fields")]
    EmptyFields(String),
    /// The captured components do not form a valid calendar date-time.
    #[error("date string `{0}` has out-of-range components")]
    OutOfRange(String),
}

/// Parse a `DD/MM/YYYY às HhMM` string into Unix epoch seconds.
///
/// The captured calendar time is interpreted in `offset` with seconds fixed
/// at zero, so the result is always a whole minute.
pub fn normalize(raw: &str, offset: FixedOffset) -> Result<i64, DateError> {
    let caps = DATE_PATTERN
        .captures(raw)
        .ok_or_else(|| DateError::Format(raw.to_string()))?;

    let mut parts = [0u32; 5];
    for (slot, group) in parts.iter_mut().zip(1usize..=5) {
        let captured = caps
            .get(group)
            .ok_or_else(|| DateError::EmptyFields(raw.to_string()))?;
        *slot = captured
            .as_str()
            .parse()
            .map_err(|_| DateError::Format(raw.to_string()))?;
    }
    let [day, month, year, hour, minute] = parts;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| DateError::OutOfRange(raw.to_string()))?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| DateError::OutOfRange(raw.to_string()))?;

    match date.and_time(time).and_local_timezone(offset) {
        LocalResult::Single(datetime) => Ok(datetime.timestamp()),
        // A fixed offset maps every local time to exactly one instant.
        _ => Err(DateError::OutOfRange(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn brasilia() -> FixedOffset {
        FixedOffset::east_opt(-3 * 3600).unwrap()
    }

    #[test]
    fn test_normalize_example_date() {
        // 14:30 at UTC-03:00 is 17:30 UTC.
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 5, 17, 30, 0)
            .unwrap()
            .timestamp();
        assert_eq!(
            normalize("05/03/2024 às 14h30", brasilia()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_normalize_single_digit_hour() {
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 5, 12, 5, 0)
            .unwrap()
            .timestamp();
        assert_eq!(
            normalize("05/03/2024 às 9h05", brasilia()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_normalize_utc_offset_zero() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let expected = Utc
            .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
            .unwrap()
            .timestamp();
        assert_eq!(normalize("01/01/2024 às 10h00", offset).unwrap(), expected);
    }

    #[test]
    fn test_normalize_is_whole_minutes() {
        let ts = normalize("05/03/2024 às 14h30", brasilia()).unwrap();
        assert_eq!(ts % 60, 0);
    }

    #[test]
    fn test_iso_date_is_a_format_error() {
        let err = normalize("2024-03-05", brasilia()).unwrap_err();
        assert!(matches!(err, DateError::Format(_)));
    }

    #[test]
    fn test_empty_string_is_a_format_error() {
        let err = normalize("", brasilia()).unwrap_err();
        assert!(matches!(err, DateError::Format(_)));
    }

    #[test]
    fn test_missing_connector_is_a_format_error() {
        let err = normalize("05/03/2024 14h30", brasilia()).unwrap_err();
        assert!(matches!(err, DateError::Format(_)));
    }

    #[test]
    fn test_impossible_day_is_out_of_range() {
        let err = normalize("32/01/2024 às 10h00", brasilia()).unwrap_err();
        assert!(matches!(err, DateError::OutOfRange(_)));
    }

    #[test]
    fn test_impossible_month_is_out_of_range() {
        let err = normalize("01/13/2024 às 10h00", brasilia()).unwrap_err();
        assert!(matches!(err, DateError::OutOfRange(_)));
    }

    #[test]
    fn test_impossible_hour_is_out_of_range() {
        let err = normalize("01/01/2024 às 25h00", brasilia()).unwrap_err();
        assert!(matches!(err, DateError::OutOfRange(_)));
    }

    #[test]
    fn test_date_embedded_in_surrounding_text() {
        // The page sometimes pads the date region with whitespace and labels.
        let expected = Utc
            .with_ymd_and_hms(2024, 1, 1, 13, 0, 0)
            .unwrap()
            .timestamp();
        assert_eq!(
            normalize("Publicado em 01/01/2024 às 10h00", brasilia()).unwrap(),
            expected
        );
    }
}
