//! Best-effort date normalization for heterogeneous export formats.
//!
//! External exports disagree on date layout. This module coerces anything
//! date-like into canonical `YYYY-MM-DD` and never fails: a string no
//! known layout matches degrades to a best-effort prefix instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime layouts, tried first, in order
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only layouts, tried after the datetime layouts, in order
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%d %b %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
];

/// Normalize an arbitrary date-like string to `YYYY-MM-DD`.
///
/// The first layout that parses wins. If nothing parses, an input of at
/// least 10 characters returns its first 10 characters verbatim (assumed
/// to already be a conforming date prefix); shorter input is returned
/// unchanged. Callers must tolerate a possibly non-canonical result
/// rather than treat it as a parse failure.
pub fn normalize_date(raw: &str) -> String {
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return dt.date().format("%Y-%m-%d").to_string();
        }
    }

    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, layout) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }

    if raw.chars().count() >= 10 {
        raw.chars().take(10).collect()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_with_seconds() {
        assert_eq!(normalize_date("2024-01-15 08:00:00"), "2024-01-15");
    }

    #[test]
    fn test_iso_with_t() {
        assert_eq!(normalize_date("2024-01-15T08:00:00"), "2024-01-15");
    }

    #[test]
    fn test_bare_date() {
        assert_eq!(normalize_date("2024-01-15"), "2024-01-15");
    }

    #[test]
    fn test_month_name_layouts() {
        assert_eq!(normalize_date("15 Jan 2024"), "2024-01-15");
        assert_eq!(normalize_date("Jan 15, 2024"), "2024-01-15");
    }

    #[test]
    fn test_us_slash_format() {
        assert_eq!(normalize_date("1/15/2024"), "2024-01-15");
        assert_eq!(normalize_date("01/15/2024"), "2024-01-15");
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(normalize_date("2024-01-15T08:00:00+09:00"), "2024-01-15");
    }

    #[test]
    fn test_unparseable_long_input_returns_prefix() {
        // A datetime without seconds matches no layout; the first 10
        // characters happen to be a conforming date prefix.
        assert_eq!(normalize_date("2024-01-15 08:00"), "2024-01-15");
        assert_eq!(normalize_date("not a date at all"), "not a date");
    }

    #[test]
    fn test_unparseable_short_input_returns_unchanged() {
        assert_eq!(normalize_date("yesterday"), "yesterday");
        assert_eq!(normalize_date(""), "");
    }
}
