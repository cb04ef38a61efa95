//! Candle interval definitions.

use chrono::TimeDelta;
use std::str::FromStr;

/// Candle interval, as understood by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bar {
    /// 1-minute bars.
    Minute1,
    /// 5-minute bars.
    Minute5,
    /// 15-minute bars.
    Minute15,
    /// 30-minute bars.
    Minute30,
    /// 1-hour bars.
    #[default]
    Hour1,
    /// 4-hour bars.
    Hour4,
    /// Daily bars (UTC aligned).
    Day1,
}

impl Bar {
    /// Returns the duration of one bar in seconds.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Hour4 => 14400,
            Self::Day1 => 86400,
        }
    }

    /// Returns the duration of one bar.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }

    /// Returns the wire identifier used by the exchange API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1H",
            Self::Hour4 => "4H",
            Self::Day1 => "1Dutc",
        }
    }
}

impl std::fmt::Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Bar {
    type Err = BarParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Minutes are lowercase on the wire, hours and days uppercase.
        match s {
            "1m" => return Ok(Self::Minute1),
            "5m" => return Ok(Self::Minute5),
            "15m" => return Ok(Self::Minute15),
            "30m" => return Ok(Self::Minute30),
            _ => {}
        }
        match s.to_lowercase().as_str() {
            "1h" | "h1" | "hour" => Ok(Self::Hour1),
            "4h" | "h4" => Ok(Self::Hour4),
            "1d" | "d1" | "1dutc" | "day" | "daily" => Ok(Self::Day1),
            _ => Err(BarParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid bar string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarParseError(String);

impl std::fmt::Display for BarParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid bar '{}', expected one of: 1m, 5m, 15m, 30m, 1H, 4H, 1D",
            self.0
        )
    }
}

impl std::error::Error for BarParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_duration() {
        assert_eq!(Bar::Minute1.seconds(), 60);
        assert_eq!(Bar::Hour1.duration(), TimeDelta::hours(1));
        assert_eq!(Bar::Hour4.duration(), TimeDelta::hours(4));
        assert_eq!(Bar::Day1.duration(), TimeDelta::days(1));
    }

    #[test]
    fn test_bar_parse() {
        assert_eq!("1H".parse::<Bar>().unwrap(), Bar::Hour1);
        assert_eq!("1h".parse::<Bar>().unwrap(), Bar::Hour1);
        assert_eq!("15m".parse::<Bar>().unwrap(), Bar::Minute15);
        assert_eq!("1D".parse::<Bar>().unwrap(), Bar::Day1);
        assert!("1M".parse::<Bar>().is_err());
        assert!("weekly".parse::<Bar>().is_err());
    }

    #[test]
    fn test_default_is_hourly() {
        assert_eq!(Bar::default(), Bar::Hour1);
        assert_eq!(Bar::default().to_string(), "1H");
    }
}
