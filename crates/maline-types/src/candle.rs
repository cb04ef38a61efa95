//! Candle and moving-average record representation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A closed price bar, reduced to the fields the feed needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candle {
    /// End of the bar's time bucket (UTC).
    pub close_time: DateTime<Utc>,
    /// Closing price.
    pub close: Decimal,
}

impl Candle {
    /// Creates a new candle.
    #[must_use]
    pub const fn new(close_time: DateTime<Utc>, close: Decimal) -> Self {
        Self { close_time, close }
    }
}

/// One row of the moving-average feed.
///
/// Both averages are already rounded to one fractional digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaRecord {
    /// Hour bucket the averages end at (UTC).
    pub timestamp: DateTime<Utc>,
    /// Simple moving average over the trailing 30 closes.
    pub ma30: Decimal,
    /// Simple moving average over the trailing 60 closes.
    pub ma60: Decimal,
}

impl MaRecord {
    /// Creates a new record.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, ma30: Decimal, ma60: Decimal) -> Self {
        Self {
            timestamp,
            ma30,
            ma60,
        }
    }
}
