//! Streaming candle-to-record aggregation.

use chrono::{DateTime, Utc};
use maline_types::{Candle, MaRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::RollingWindow;

/// Fraction digits kept in emitted averages.
const OUTPUT_SCALE: u32 = 1;

/// Errors raised while aggregating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// A candle was not strictly after its predecessor.
    #[error("candle at {current} is not after the previous candle at {previous}")]
    OutOfOrder {
        /// Close time of the previous candle.
        previous: DateTime<Utc>,
        /// Close time of the offending candle.
        current: DateTime<Utc>,
    },
}

/// Streaming moving-average aggregator.
///
/// Feeds candles in ascending close-time order into a [`RollingWindow`] and
/// emits an [`MaRecord`] for every candle once both averages exist, that is
/// from the 60th candle on.
#[derive(Debug, Default)]
pub struct MovingAverageAggregator {
    window: RollingWindow,
    last_close_time: Option<DateTime<Utc>>,
    observed: usize,
}

impl MovingAverageAggregator {
    /// Creates a new aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of candles processed so far.
    #[must_use]
    pub const fn observed(&self) -> usize {
        self.observed
    }

    /// Processes a candle, emitting a record once the long window is full.
    ///
    /// # Errors
    ///
    /// Returns an error if the candle is not strictly after the previous one.
    pub fn process(&mut self, candle: &Candle) -> Result<Option<MaRecord>, AggregateError> {
        if let Some(previous) = self.last_close_time
            && candle.close_time <= previous
        {
            return Err(AggregateError::OutOfOrder {
                previous,
                current: candle.close_time,
            });
        }
        self.last_close_time = Some(candle.close_time);
        self.observed += 1;
        self.window.push(candle.close);

        let (Some(ma30), Some(ma60)) = (self.window.short_mean(), self.window.long_mean()) else {
            return Ok(None);
        };
        Ok(Some(MaRecord::new(
            candle.close_time,
            round_output(ma30),
            round_output(ma60),
        )))
    }
}

/// Aggregates an ascending candle sequence into records.
///
/// # Errors
///
/// Returns an error if the candles are not strictly ascending.
pub fn aggregate<'a>(
    candles: impl IntoIterator<Item = &'a Candle>,
) -> Result<Vec<MaRecord>, AggregateError> {
    let mut aggregator = MovingAverageAggregator::new();
    let mut records = Vec::new();

    for candle in candles {
        if let Some(record) = aggregator.process(candle)? {
            records.push(record);
        }
    }

    Ok(records)
}

/// Rounds half away from zero and pins the scale to one fraction digit.
fn round_output(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(OUTPUT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(OUTPUT_SCALE);
    rounded
}
