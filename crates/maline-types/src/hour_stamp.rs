//! `YYYYMMDDhh` hour stamps.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::HourStampError;

/// chrono format string for hour stamps.
pub const HOUR_STAMP_FORMAT: &str = "%Y%m%d%H";

/// Formats a timestamp as a `YYYYMMDDhh` hour stamp (UTC).
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use maline_types::format_hour_stamp;
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 28, 15, 0, 0).unwrap();
/// assert_eq!(format_hour_stamp(ts), "2025012815");
/// ```
#[must_use]
pub fn format_hour_stamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(HOUR_STAMP_FORMAT).to_string()
}

/// Parses a `YYYYMMDDhh` hour stamp into a UTC timestamp.
///
/// # Errors
///
/// Returns an error if the input is not exactly ten digits forming a valid
/// date and hour.
pub fn parse_hour_stamp(value: &str) -> Result<DateTime<Utc>, HourStampError> {
    let value = value.trim();
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HourStampError(value.to_string()));
    }

    // chrono cannot parse a datetime without minutes, so pad them.
    NaiveDateTime::parse_from_str(&format!("{value}00"), "%Y%m%d%H%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| HourStampError(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap();
        assert_eq!(format_hour_stamp(ts), "2024030507");
    }

    #[test]
    fn test_parse() {
        let ts = parse_hour_stamp("2025012816").unwrap();
        assert_eq!(ts.year(), 2025);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 28);
        assert_eq!(ts.hour(), 16);
        assert_eq!(ts.minute(), 0);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_hour_stamp(" 2025012816\n").is_ok());
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(parse_hour_stamp("").is_err());
        assert!(parse_hour_stamp("20250128").is_err());
        assert!(parse_hour_stamp("2025-01-28").is_err());
        assert!(parse_hour_stamp("2025013125").is_err());
        assert!(parse_hour_stamp("2025023012").is_err());
        assert!(parse_hour_stamp("202501281600").is_err());
    }
}
