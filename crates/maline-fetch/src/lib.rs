//! OKX candle fetching for the maline moving-average feed builder.
//!
//! This crate provides the retrieval pipeline:
//!
//! - [`url::history_candles_url`] - Constructs `history-candles` request URLs
//! - [`OkxClient`] - HTTP page fetcher with proxy and TLS configuration
//! - [`parse_candles`] - Typed parsing of the API response body
//! - [`retry`] - Retry wrapper with exponential backoff
//! - [`page_stream`] / [`fetch_history`] - Cursor pagination backward in time

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/maline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod paginate;
mod parse;
mod retry;
mod source;
pub mod url;

pub use client::{ClientConfig, FetchError, OkxClient};
pub use paginate::{
    CandlePage, DEFAULT_MAX_PAGES, HistoryRequest, PaginationError, fetch_history, merge_pages,
    page_stream,
};
pub use parse::{ParseError, parse_candles};
pub use retry::{RetryError, RetryPolicy, retry};
pub use source::{CandleSource, PageRequest};
