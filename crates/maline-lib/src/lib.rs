//! Hourly moving-average feeds built from OKX candle history.
//!
//! This is a facade crate that re-exports functionality from the maline
//! workspace crates and adds the end-to-end pipeline tying them together.
//!
//! # Quick Start
//!
//! ```ignore
//! use maline_lib::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OkxClient::with_defaults()?;
//!     let policy = client.config().retry_policy();
//!     let plan = FeedPlan::default();
//!
//!     let summary = run_feed(&client, &policy, &plan, chrono::Utc::now(), "ma.csv", |page| {
//!         println!("page {} with {} candles", page.index, page.len());
//!     })
//!     .await?;
//!     println!("wrote {} rows", summary.records);
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/maline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(all(feature = "fetch", feature = "aggregate", feature = "format"))]
mod pipeline;

// Re-export core types
pub use maline_types::*;

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use maline_fetch::{
    CandlePage, CandleSource, ClientConfig, FetchError, HistoryRequest, OkxClient, PageRequest,
    PaginationError, ParseError, RetryError, RetryPolicy, fetch_history, merge_pages,
    page_stream, retry,
};

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use maline_aggregate::{
    AggregateError, LONG_PERIOD, MaStartDates, MaTrend, MovingAverageAggregator, RollingWindow,
    SHORT_PERIOD, Trend, TrendError, aggregate, ma_start_dates, ma_trend,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use maline_format::{CSV_HEADER, CsvFormatter, FormatError, read_records, write_csv_atomic};

#[cfg(all(feature = "fetch", feature = "aggregate", feature = "format"))]
pub use pipeline::{Feed, FeedError, FeedPlan, FeedSummary, build_feed, run_feed};

/// Prelude module for convenient imports.
///
/// ```
/// use maline_lib::prelude::*;
/// ```
pub mod prelude {
    pub use maline_types::{Bar, Candle, InstrumentId, LookbackWindow, MaRecord};

    #[cfg(feature = "fetch")]
    pub use maline_fetch::{CandleSource, ClientConfig, OkxClient, RetryPolicy, page_stream};

    #[cfg(feature = "aggregate")]
    pub use maline_aggregate::{MovingAverageAggregator, ma_start_dates, ma_trend};

    #[cfg(feature = "format")]
    pub use maline_format::{CsvFormatter, read_records, write_csv_atomic};

    #[cfg(all(feature = "fetch", feature = "aggregate", feature = "format"))]
    pub use crate::pipeline::{FeedPlan, build_feed, run_feed};
}
