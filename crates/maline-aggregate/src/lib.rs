//! Moving-average aggregation for the maline feed builder.
//!
//! This crate provides candle-to-record aggregation:
//!
//! - [`RollingWindow`] - Fixed 60-slot window with running MA30/MA60 sums
//! - [`MovingAverageAggregator`] - Streaming candle aggregator
//! - [`ma_start_dates`] - First hours covered by the averages ending at an hour
//! - [`ma_trend`] - Direction of both averages at an hour

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/maline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod starts;
mod trend;
mod window;

pub use aggregator::{AggregateError, MovingAverageAggregator, aggregate};
pub use starts::{MaStartDates, ma_start_dates};
pub use trend::{MaTrend, Trend, TrendError, ma_trend};
pub use window::{LONG_PERIOD, RollingWindow, SHORT_PERIOD};
