//! End-to-end feed runs against in-memory candle sources.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use maline_lib::{
    Bar, Candle, CandleSource, FeedError, FeedPlan, FetchError, InstrumentId, LookbackWindow,
    PageRequest, PaginationError, RetryPolicy, build_feed, read_records, run_feed,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

fn hour(t: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(t)
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        timeout: Duration::from_secs(5),
        backoff_delay: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

fn plan(lookback_hours: i64, page_limit: u32) -> FeedPlan {
    FeedPlan::new(
        InstrumentId::default(),
        Bar::Hour1,
        LookbackWindow::new(TimeDelta::hours(lookback_hours)).unwrap(),
    )
    .with_page_limit(page_limit)
}

/// Serves pages out of a fixed ascending history, like the exchange does:
/// the newest `limit` candles closing at or before the page end.
struct HistorySource {
    history: Vec<Candle>,
    failures_before_success: usize,
    calls: AtomicUsize,
}

impl HistorySource {
    /// Hours `from..=to` with close = t - 9.
    fn new(from: i64, to: i64) -> Self {
        let history = (from..=to)
            .map(|t| Candle::new(hour(t), Decimal::from(t - 9)))
            .collect();
        Self {
            history,
            failures_before_success: 0,
            calls: AtomicUsize::new(0),
        }
    }

    fn flaky(mut self, failures: usize) -> Self {
        self.failures_before_success = failures;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleSource for HistorySource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Candle>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            return Err(FetchError::Network("connection reset by peer".into()));
        }

        Ok(self
            .history
            .iter()
            .rev()
            .filter(|candle| candle.close_time <= request.end)
            .take(request.limit as usize)
            .copied()
            .collect())
    }
}

#[tokio::test]
async fn test_first_record_from_two_pages() {
    // Closes 1..60 at t=10..69, served as two pages of 30.
    let source = HistorySource::new(10, 69);
    let mut pages = Vec::new();

    let feed = build_feed(&source, &fast_policy(0), &plan(1, 30), hour(69), |page| {
        pages.push((page.index, page.len()));
    })
    .await
    .unwrap();

    assert_eq!(pages, vec![(0, 30), (1, 30)]);
    assert_eq!(source.calls(), 2);
    assert_eq!(feed.candles, 60);
    assert_eq!(feed.records.len(), 1);

    let record = feed.records[0];
    assert_eq!(record.timestamp, hour(69));
    assert_eq!(record.ma30, Decimal::new(455, 1));
    assert_eq!(record.ma60, Decimal::new(305, 1));
}

#[tokio::test]
async fn test_rows_cover_lookback_window() {
    let source = HistorySource::new(0, 400);
    let now = hour(400) + TimeDelta::minutes(27);

    let feed = build_feed(&source, &fast_policy(0), &plan(48, 100), now, |_| {})
        .await
        .unwrap();

    assert_eq!(feed.records.len(), 48);
    assert_eq!(feed.records[0].timestamp, hour(353));
    assert_eq!(feed.records[47].timestamp, hour(400));
    assert!(
        feed.records
            .windows(2)
            .all(|w| w[1].timestamp - w[0].timestamp == TimeDelta::hours(1))
    );
    // The warm-up reached far enough back for a full long average.
    assert!(feed.pages <= 3);
}

#[tokio::test]
async fn test_identical_pages_give_identical_files() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let now = hour(300);

    for path in [&first, &second] {
        let source = HistorySource::new(0, 300);
        run_feed(&source, &fast_policy(0), &plan(72, 40), now, path, |_| {})
            .await
            .unwrap();
    }

    let first = std::fs::read(&first).unwrap();
    assert_eq!(first, std::fs::read(&second).unwrap());
    assert!(first.starts_with(b"timestamp,ma30,ma60\n"));
}

#[tokio::test]
async fn test_written_feed_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.csv");
    let source = HistorySource::new(0, 200);

    let summary = run_feed(&source, &fast_policy(0), &plan(24, 100), hour(200), &path, |_| {})
        .await
        .unwrap();

    let records = read_records(&path).await.unwrap();
    assert_eq!(records.len(), summary.records);
    assert_eq!(summary.records, 24);
    assert_eq!(summary.first, hour(177));
    assert_eq!(summary.last, hour(200));
    assert_eq!(records[0].timestamp, summary.first);
}

#[tokio::test]
async fn test_empty_history_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.csv");
    let source = HistorySource::new(0, -1);

    let err = run_feed(&source, &fast_policy(0), &plan(24, 100), hour(100), &path, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FeedError::IncompleteWindow {
            candles: 0,
            required: 60
        }
    ));
    assert_eq!(err.kind(), "incomplete window");
    assert!(!path.exists());
}

#[tokio::test]
async fn test_short_history_is_incomplete() {
    let source = HistorySource::new(0, 40);
    let err = build_feed(&source, &fast_policy(0), &plan(24, 100), hour(40), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::IncompleteWindow { candles: 41, .. }));
}

#[tokio::test]
async fn test_transient_failures_then_success() {
    let source = HistorySource::new(0, 99).flaky(2);

    let feed = build_feed(&source, &fast_policy(3), &plan(1, 100), hour(99), |_| {})
        .await
        .unwrap();

    // One page covers the window, so every call is an attempt at page 0.
    assert_eq!(source.calls(), 3);
    assert_eq!(feed.records.len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_abort_without_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.csv");
    std::fs::write(&path, "previous run\n").unwrap();
    let source = HistorySource::new(0, 99).flaky(usize::MAX);

    let err = run_feed(&source, &fast_policy(2), &plan(1, 100), hour(99), &path, |_| {})
        .await
        .unwrap_err();

    assert_eq!(source.calls(), 3);
    assert!(matches!(err, FeedError::Pagination(PaginationError::Fetch(_))));
    assert_eq!(err.attempts(), Some(3));
    assert_eq!(err.kind(), "transient network error");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run\n");
}

#[tokio::test]
async fn test_stale_history_has_no_rows_in_window() {
    let source = HistorySource::new(0, 99);
    let err = build_feed(&source, &fast_policy(0), &plan(24, 100), hour(500), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::NoRecordsInWindow { latest } if latest == hour(99)));
}
