//! Core types for the maline moving-average feed builder.
//!
//! This crate provides the fundamental data structures used throughout maline:
//!
//! - [`Candle`] - A closed price bar reduced to its close time and close price
//! - [`MaRecord`] - One hourly row of the MA30/MA60 feed
//! - [`Bar`] - Candle interval
//! - [`InstrumentId`] - Exchange instrument identifier
//! - [`LookbackWindow`] - Historical span to retrieve
//! - [`format_hour_stamp`] / [`parse_hour_stamp`] - `YYYYMMDDhh` conversion

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/maline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod candle;
mod error;
mod hour_stamp;
mod instrument;
mod lookback;

pub use bar::{Bar, BarParseError};
pub use candle::{Candle, MaRecord};
pub use error::{HourStampError, LookbackError};
pub use hour_stamp::{HOUR_STAMP_FORMAT, format_hour_stamp, parse_hour_stamp};
pub use instrument::{DEFAULT_INSTRUMENT, InstrumentId};
pub use lookback::{LookbackWindow, MAX_LOOKBACK_DAYS};
