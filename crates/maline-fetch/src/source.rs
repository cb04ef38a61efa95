//! Page source abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maline_types::{Bar, Candle, InstrumentId};

use crate::FetchError;

/// One page request: up to `limit` closed bars ending at `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Instrument to fetch.
    pub instrument: InstrumentId,
    /// Bar interval.
    pub bar: Bar,
    /// Latest close time the page may contain (inclusive).
    pub end: DateTime<Utc>,
    /// Maximum number of candles in the page.
    pub limit: u32,
}

impl PageRequest {
    /// Creates a new page request.
    #[must_use]
    pub const fn new(instrument: InstrumentId, bar: Bar, end: DateTime<Utc>, limit: u32) -> Self {
        Self {
            instrument,
            bar,
            end,
            limit,
        }
    }

    /// Exclusive upper bound on bar open time, in epoch milliseconds.
    #[must_use]
    pub fn after_millis(&self) -> i64 {
        (self.end - self.bar.duration()).timestamp_millis() + 1
    }
}

/// A source of candle pages, newest first.
///
/// [`crate::OkxClient`] is the network implementation; tests drive the
/// pagination controller with in-memory sources.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetches one page of candles ordered newest-to-oldest.
    ///
    /// # Errors
    ///
    /// Returns an error if the single underlying request fails.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Candle>, FetchError>;
}
