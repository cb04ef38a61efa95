//! Cursor pagination backward in time.

use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, Stream, TryStreamExt};
use maline_types::{Bar, Candle, InstrumentId, LookbackWindow};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::url::MAX_PAGE_LIMIT;
use crate::{CandleSource, PageRequest, RetryError, RetryPolicy, retry};

/// Smallest page cap applied when none is set explicitly.
pub const DEFAULT_MAX_PAGES: usize = 200;

/// What history to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Instrument to fetch.
    pub instrument: InstrumentId,
    /// Bar interval.
    pub bar: Bar,
    /// How far back from "now" to go.
    pub lookback: LookbackWindow,
    /// Candles requested per page.
    pub page_limit: u32,
    /// Hard cap on pages fetched in one run. Derived from the window when
    /// unset, see [`HistoryRequest::page_cap`].
    pub max_pages: Option<usize>,
}

impl HistoryRequest {
    /// Creates a request with the largest page size and a derived page cap.
    #[must_use]
    pub const fn new(instrument: InstrumentId, bar: Bar, lookback: LookbackWindow) -> Self {
        Self {
            instrument,
            bar,
            lookback,
            page_limit: MAX_PAGE_LIMIT,
            max_pages: None,
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Sets an explicit page cap.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Returns the number of pages a well-behaved API needs at most:
    /// `ceil(lookback / (page_limit * bar)) + 1`.
    #[must_use]
    pub fn expected_pages(&self) -> usize {
        let bars = self.lookback.bar_count(self.bar);
        bars.div_ceil(u64::from(self.page_limit.max(1))) as usize + 1
    }

    /// Returns the page cap in force: the explicit one if set, otherwise
    /// twice [`expected_pages`](Self::expected_pages) and never less than
    /// [`DEFAULT_MAX_PAGES`].
    #[must_use]
    pub fn page_cap(&self) -> usize {
        self.max_pages
            .unwrap_or_else(|| DEFAULT_MAX_PAGES.max(self.expected_pages().saturating_mul(2)))
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandlePage {
    /// Zero-based page number.
    pub index: usize,
    /// Cursor the page was requested at.
    pub end: DateTime<Utc>,
    /// Candles as returned, newest first.
    pub candles: Vec<Candle>,
}

impl CandlePage {
    /// Returns the number of candles in the page.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.candles.len()
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Returns the earliest close time in the page.
    #[must_use]
    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.candles.iter().map(|c| c.close_time).min()
    }

    /// Returns the latest close time in the page.
    #[must_use]
    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.candles.iter().map(|c| c.close_time).max()
    }
}

/// Errors that abort pagination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// A page request failed after retries, or fatally.
    #[error(transparent)]
    Fetch(#[from] RetryError),

    /// A page did not move the cursor backward.
    #[error("pagination stalled: page at cursor {cursor} has oldest candle {oldest}")]
    Stalled {
        /// Cursor the page was requested at.
        cursor: DateTime<Utc>,
        /// Oldest close time in the returned page.
        oldest: DateTime<Utc>,
    },

    /// More pages than the configured cap were needed.
    #[error("pagination exceeded {0} pages")]
    TooManyPages(usize),

    /// The page size is zero.
    #[error("page limit must be at least 1")]
    InvalidPageLimit,
}

/// Pagination state between pages.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    index: usize,
    end: DateTime<Utc>,
}

/// Creates an async stream of candle pages, walking backward from `now`.
///
/// Each page is fetched through [`retry`]. The stream ends when the API
/// returns an empty page or the cursor reaches `now - lookback`; it fails if
/// a page does not move the cursor backward or the page cap is hit.
///
/// # Arguments
///
/// * `source` - Page source to fetch from
/// * `policy` - Retry policy applied to every page request
/// * `request` - What history to retrieve
/// * `now` - Instant the lookback window is measured from
pub fn page_stream<'a, S>(
    source: &'a S,
    policy: &'a RetryPolicy,
    request: &'a HistoryRequest,
    now: DateTime<Utc>,
) -> impl Stream<Item = Result<CandlePage, PaginationError>> + 'a
where
    S: CandleSource + ?Sized,
{
    let start = request.lookback.start(now);
    let first = Cursor { index: 0, end: now };

    stream::try_unfold(Some(first), move |cursor| async move {
        match cursor {
            Some(cursor) => next_page(source, policy, request, start, cursor).await,
            None => Ok(None),
        }
    })
}

/// Fetches the page at `cursor` and computes the following cursor.
async fn next_page<S>(
    source: &S,
    policy: &RetryPolicy,
    request: &HistoryRequest,
    start: DateTime<Utc>,
    cursor: Cursor,
) -> Result<Option<(CandlePage, Option<Cursor>)>, PaginationError>
where
    S: CandleSource + ?Sized,
{
    if request.page_limit == 0 {
        return Err(PaginationError::InvalidPageLimit);
    }
    let cap = request.page_cap();
    if cursor.index >= cap {
        return Err(PaginationError::TooManyPages(cap));
    }

    let page_request = PageRequest::new(
        request.instrument.clone(),
        request.bar,
        cursor.end,
        request.page_limit,
    );
    let candles = retry(policy, || source.fetch_page(&page_request)).await?;

    let page = CandlePage {
        index: cursor.index,
        end: cursor.end,
        candles,
    };
    let Some(oldest) = page.oldest() else {
        debug!(page = page.index, "empty page, history exhausted");
        return Ok(None);
    };

    let next_end = oldest - request.bar.duration();
    if next_end >= cursor.end {
        return Err(PaginationError::Stalled {
            cursor: cursor.end,
            oldest,
        });
    }

    info!(
        page = page.index,
        candles = page.len(),
        oldest = %oldest,
        "fetched candle page"
    );

    let next = (next_end > start).then_some(Cursor {
        index: cursor.index + 1,
        end: next_end,
    });
    Ok(Some((page, next)))
}

/// Merges pages into one ascending, duplicate-free candle sequence.
///
/// When two pages carry the same close time the first one seen wins. Gaps
/// longer than one bar are logged, not filled.
#[must_use]
pub fn merge_pages(pages: impl IntoIterator<Item = CandlePage>, bar: Bar) -> Vec<Candle> {
    let mut by_time = BTreeMap::new();
    for page in pages {
        for candle in page.candles {
            by_time.entry(candle.close_time).or_insert(candle);
        }
    }

    let candles: Vec<Candle> = by_time.into_values().collect();
    report_gaps(&candles, bar.duration());
    candles
}

/// Logs every gap between consecutive candles.
fn report_gaps(candles: &[Candle], step: TimeDelta) {
    for pair in candles.windows(2) {
        let gap = pair[1].close_time - pair[0].close_time;
        if gap > step {
            warn!(
                after = %pair[0].close_time,
                before = %pair[1].close_time,
                missing = gap.num_seconds() / step.num_seconds() - 1,
                "gap in candle history"
            );
        }
    }
}

/// Fetches the full history described by `request` and merges it.
///
/// # Errors
///
/// Returns the first [`PaginationError`] raised by [`page_stream`].
pub async fn fetch_history<S>(
    source: &S,
    policy: &RetryPolicy,
    request: &HistoryRequest,
    now: DateTime<Utc>,
) -> Result<Vec<Candle>, PaginationError>
where
    S: CandleSource + ?Sized,
{
    let pages: Vec<CandlePage> = page_stream(source, policy, request, now)
        .try_collect()
        .await?;
    Ok(merge_pages(pages, request.bar))
}
