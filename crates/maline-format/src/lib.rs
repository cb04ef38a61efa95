//! CSV input and output for maline MA feeds.
//!
//! - [`CsvFormatter`] - Writes records in the `timestamp,ma30,ma60` schema
//! - [`write_csv_atomic`] - Persists a complete feed or nothing
//! - [`read_records`] - Loads and validates a feed written earlier

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/maline/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod atomic;
mod csv;
mod error;
mod reader;

pub use crate::csv::{CSV_HEADER, CsvFormatter};
pub use atomic::write_csv_atomic;
pub use error::FormatError;
pub use reader::read_records;
