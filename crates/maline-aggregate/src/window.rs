//! Fixed-capacity rolling window over closes.

use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Period of the short moving average.
pub const SHORT_PERIOD: usize = 30;
/// Period of the long moving average, and the window capacity.
pub const LONG_PERIOD: usize = 60;

/// The last [`LONG_PERIOD`] closes with running sums for both periods.
///
/// Each push adds the new close to both sums and subtracts whatever left
/// each period, so updates are O(1) and the sums never need recomputing.
/// Sums are exact decimals.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    closes: VecDeque<Decimal>,
    short_sum: Decimal,
    long_sum: Decimal,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingWindow {
    /// Creates an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            closes: VecDeque::with_capacity(LONG_PERIOD),
            short_sum: Decimal::ZERO,
            long_sum: Decimal::ZERO,
        }
    }

    /// Pushes a close, evicting the oldest one once the window is full.
    pub fn push(&mut self, close: Decimal) {
        if self.closes.len() == LONG_PERIOD
            && let Some(evicted) = self.closes.pop_front()
        {
            self.long_sum -= evicted;
        }

        self.closes.push_back(close);
        self.long_sum += close;
        self.short_sum += close;

        let len = self.closes.len();
        if len > SHORT_PERIOD {
            self.short_sum -= self.closes[len - 1 - SHORT_PERIOD];
        }
    }

    /// Returns the number of closes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Returns true if no close has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Returns true once [`LONG_PERIOD`] closes are held.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.closes.len() == LONG_PERIOD
    }

    /// Returns the short average, once [`SHORT_PERIOD`] closes are held.
    #[must_use]
    pub fn short_mean(&self) -> Option<Decimal> {
        (self.closes.len() >= SHORT_PERIOD).then(|| self.short_sum / Decimal::from(SHORT_PERIOD))
    }

    /// Returns the long average, once the window is full.
    #[must_use]
    pub fn long_mean(&self) -> Option<Decimal> {
        self.is_full()
            .then(|| self.long_sum / Decimal::from(LONG_PERIOD))
    }
}
