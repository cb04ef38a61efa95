//! Error types for maline core types.

use thiserror::Error;

/// Error for an input that is not a valid `YYYYMMDDhh` hour stamp.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid hour stamp '{0}', expected YYYYMMDDhh (e.g. 2025012816)")]
pub struct HourStampError(pub String);

/// Error for invalid lookback windows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookbackError {
    /// The window is zero or negative.
    #[error("lookback window must be positive, got {0} hours")]
    NotPositive(i64),

    /// The window is longer than the supported maximum.
    #[error("lookback window must be at most {max} days, got {days} days")]
    TooLong {
        /// Requested length in whole days.
        days: i64,
        /// Longest accepted length in days.
        max: i64,
    },
}
