//! Direction of the moving averages at a given hour.

use chrono::{DateTime, Utc};
use derive_more::Display;
use maline_types::{MaRecord, format_hour_stamp};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use thiserror::Error;

/// Direction of an average between two consecutive records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Trend {
    /// The latest value is higher.
    #[display("up")]
    Up,
    /// The latest value is lower.
    #[display("down")]
    Down,
    /// Both values are equal.
    #[display("flat")]
    Flat,
}

impl Trend {
    /// Labels the move from `previous` to `latest`.
    #[must_use]
    pub fn between(previous: Decimal, latest: Decimal) -> Self {
        match latest.cmp(&previous) {
            Ordering::Greater => Self::Up,
            Ordering::Less => Self::Down,
            Ordering::Equal => Self::Flat,
        }
    }
}

/// Errors raised when computing a trend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrendError {
    /// Fewer than two records exist at or before the requested hour.
    #[error("need at least 2 records at or before {}, found {found}", format_hour_stamp(*at))]
    NotEnoughRecords {
        /// Records found at or before `at`.
        found: usize,
        /// The requested hour.
        at: DateTime<Utc>,
    },
}

/// Trend of both averages at an hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaTrend {
    /// The requested hour.
    pub at: DateTime<Utc>,
    /// Latest record at or before `at`.
    pub latest: MaRecord,
    /// The record before `latest`.
    pub previous: MaRecord,
    /// Direction of the short average.
    pub ma30: Trend,
    /// Direction of the long average.
    pub ma60: Trend,
}

/// Compares the latest two records at or before `at`.
///
/// `records` must be sorted ascending by timestamp.
///
/// # Errors
///
/// Returns an error if fewer than two records qualify.
pub fn ma_trend(records: &[MaRecord], at: DateTime<Utc>) -> Result<MaTrend, TrendError> {
    let found = records.partition_point(|record| record.timestamp <= at);
    let &[.., previous, latest] = &records[..found] else {
        return Err(TrendError::NotEnoughRecords { found, at });
    };

    Ok(MaTrend {
        at,
        latest,
        previous,
        ma30: Trend::between(previous.ma30, latest.ma30),
        ma60: Trend::between(previous.ma60, latest.ma60),
    })
}
