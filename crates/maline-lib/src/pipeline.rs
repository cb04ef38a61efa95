//! End-to-end feed pipeline: paginate, aggregate, persist.

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use maline_aggregate::{AggregateError, LONG_PERIOD, aggregate};
use maline_fetch::url::MAX_PAGE_LIMIT;
use maline_fetch::{
    CandlePage, CandleSource, HistoryRequest, PaginationError, RetryPolicy, merge_pages,
    page_stream,
};
use maline_format::{FormatError, write_csv_atomic};
use maline_types::{Bar, InstrumentId, LookbackWindow, MaRecord};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// What feed to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPlan {
    /// Instrument to fetch.
    pub instrument: InstrumentId,
    /// Bar interval.
    pub bar: Bar,
    /// Span of the emitted rows, counted back from "now".
    pub lookback: LookbackWindow,
    /// Candles requested per page.
    pub page_limit: u32,
    /// Explicit cap on pages fetched in one run. When unset the cap is
    /// derived from the widened window.
    pub max_pages: Option<usize>,
    /// Extra bars fetched before the window so its first row has a full
    /// long average.
    pub warmup_bars: u32,
}

impl Default for FeedPlan {
    fn default() -> Self {
        Self {
            instrument: InstrumentId::default(),
            bar: Bar::default(),
            lookback: LookbackWindow::default(),
            page_limit: MAX_PAGE_LIMIT,
            max_pages: None,
            warmup_bars: LONG_PERIOD as u32 - 1,
        }
    }
}

impl FeedPlan {
    /// Creates a plan with default paging and warm-up.
    #[must_use]
    pub fn new(instrument: InstrumentId, bar: Bar, lookback: LookbackWindow) -> Self {
        Self {
            instrument,
            bar,
            lookback,
            ..Self::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Sets the page cap.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Sets the warm-up length in bars.
    #[must_use]
    pub const fn with_warmup_bars(mut self, warmup_bars: u32) -> Self {
        self.warmup_bars = warmup_bars;
        self
    }

    /// Returns the history request covering the window plus warm-up.
    #[must_use]
    pub fn history_request(&self) -> HistoryRequest {
        let request = HistoryRequest::new(
            self.instrument.clone(),
            self.bar,
            self.lookback.widened(self.bar, self.warmup_bars),
        )
        .with_page_limit(self.page_limit);
        match self.max_pages {
            Some(max_pages) => request.with_max_pages(max_pages),
            None => request,
        }
    }
}

/// Errors that abort a feed run.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Fetching history failed.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// The merged history could not be aggregated.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Too few candles to produce a single row.
    #[error("only {candles} candles available, at least {required} are needed")]
    IncompleteWindow {
        /// Candles retrieved.
        candles: usize,
        /// Candles needed for one row.
        required: usize,
    },

    /// No row falls inside the lookback window.
    #[error("no candles close inside the lookback window (latest: {latest})")]
    NoRecordsInWindow {
        /// Close time of the newest candle retrieved.
        latest: DateTime<Utc>,
    },

    /// Writing the feed failed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl FeedError {
    /// Returns a short name for the error kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pagination(PaginationError::Fetch(e)) => e.fetch_error().kind(),
            Self::Pagination(PaginationError::Stalled { .. }) => "stalled pagination",
            Self::Pagination(_) => "pagination error",
            Self::Aggregate(_) => "aggregation error",
            Self::IncompleteWindow { .. } | Self::NoRecordsInWindow { .. } => {
                "incomplete window"
            }
            Self::Format(_) => "output error",
        }
    }

    /// Returns the attempts made by the failing request, if a request failed.
    #[must_use]
    pub const fn attempts(&self) -> Option<u32> {
        match self {
            Self::Pagination(PaginationError::Fetch(e)) => Some(e.attempts()),
            _ => None,
        }
    }
}

/// Records built for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Rows inside the lookback window, ascending.
    pub records: Vec<MaRecord>,
    /// Pages fetched.
    pub pages: usize,
    /// Distinct candles retrieved, warm-up included.
    pub candles: usize,
}

/// Outcome of a persisted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    /// Pages fetched.
    pub pages: usize,
    /// Distinct candles retrieved.
    pub candles: usize,
    /// Rows written.
    pub records: usize,
    /// First row's timestamp.
    pub first: DateTime<Utc>,
    /// Last row's timestamp.
    pub last: DateTime<Utc>,
}

/// Fetches the planned history and turns it into MA rows.
///
/// `on_page` is called once per fetched page, in fetch order.
///
/// # Errors
///
/// Returns an error if pagination fails, fewer than 60 candles are
/// retrieved, or no row falls inside the lookback window.
pub async fn build_feed<S, F>(
    source: &S,
    policy: &RetryPolicy,
    plan: &FeedPlan,
    now: DateTime<Utc>,
    mut on_page: F,
) -> Result<Feed, FeedError>
where
    S: CandleSource + ?Sized,
    F: FnMut(&CandlePage),
{
    let request = plan.history_request();
    let mut stream = std::pin::pin!(page_stream(source, policy, &request, now));

    let mut pages = Vec::new();
    while let Some(page) = stream.try_next().await? {
        on_page(&page);
        pages.push(page);
    }
    let page_count = pages.len();

    let candles = merge_pages(pages, plan.bar);
    if candles.len() < LONG_PERIOD {
        return Err(FeedError::IncompleteWindow {
            candles: candles.len(),
            required: LONG_PERIOD,
        });
    }

    let records: Vec<MaRecord> = aggregate(&candles)?
        .into_iter()
        .filter(|record| plan.lookback.contains(now, record.timestamp))
        .collect();
    if records.is_empty() {
        let latest = candles.last().map_or(now, |candle| candle.close_time);
        return Err(FeedError::NoRecordsInWindow { latest });
    }

    info!(
        pages = page_count,
        candles = candles.len(),
        records = records.len(),
        "feed built"
    );
    Ok(Feed {
        records,
        pages: page_count,
        candles: candles.len(),
    })
}

/// Builds the feed and writes it atomically to `output`.
///
/// Nothing is written unless every step succeeds.
///
/// # Errors
///
/// Returns an error if [`build_feed`] fails or the file cannot be written.
pub async fn run_feed<S, F>(
    source: &S,
    policy: &RetryPolicy,
    plan: &FeedPlan,
    now: DateTime<Utc>,
    output: impl AsRef<Path>,
    on_page: F,
) -> Result<FeedSummary, FeedError>
where
    S: CandleSource + ?Sized,
    F: FnMut(&CandlePage),
{
    let feed = build_feed(source, policy, plan, now, on_page).await?;
    let output = output.as_ref();
    write_csv_atomic(output, &feed.records)?;

    let (first, last) = match (feed.records.first(), feed.records.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp),
        _ => (now, now),
    };
    info!(path = %output.display(), rows = feed.records.len(), "feed written");
    Ok(FeedSummary {
        pages: feed.pages,
        candles: feed.candles,
        records: feed.records.len(),
        first,
        last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_default_plan() {
        let plan = FeedPlan::default();
        assert_eq!(plan.instrument.as_str(), "SOL-USDT-SWAP");
        assert_eq!(plan.bar, Bar::Hour1);
        assert_eq!(plan.page_limit, 100);
        assert_eq!(plan.warmup_bars, 59);
    }

    #[test]
    fn test_history_request_includes_warmup() {
        let plan = FeedPlan::default().with_page_limit(50).with_max_pages(9);
        let request = plan.history_request();

        assert_eq!(
            request.lookback.span(),
            TimeDelta::days(30) + TimeDelta::hours(59)
        );
        assert_eq!(request.page_limit, 50);
        assert_eq!(request.page_cap(), 9);
    }

    #[test]
    fn test_minute_plan_page_cap_covers_window() {
        let plan = FeedPlan::new(
            InstrumentId::default(),
            Bar::Minute1,
            LookbackWindow::days(30).unwrap(),
        );
        let request = plan.history_request();

        assert_eq!(request.expected_pages(), 434);
        assert!(request.page_cap() >= request.expected_pages());
    }
}
