//! Format errors.

use chrono::{DateTime, Utc};
use maline_types::format_hour_stamp;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a feed.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Writing to an output stream failed.
    #[error("I/O error: {0}")]
    Write(#[from] std::io::Error),

    /// A file operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The CSV layer rejected the input.
    #[error("CSV error in '{path}': {source}")]
    Csv {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: csv_async::Error,
    },

    /// The header lacks required columns.
    #[error("'{path}' is missing columns: {missing}")]
    MissingColumns {
        /// File being read.
        path: PathBuf,
        /// Comma-separated missing column names.
        missing: String,
    },

    /// A timestamp field is not a valid `YYYYMMDDhh` hour stamp.
    #[error("line {line}: invalid timestamp '{value}', expected YYYYMMDDhh")]
    Timestamp {
        /// 1-based line number.
        line: u64,
        /// Offending field.
        value: String,
    },

    /// An average field is not a number.
    #[error("line {line}: {field} value '{value}' is not a number")]
    Number {
        /// 1-based line number.
        line: u64,
        /// Column name.
        field: &'static str,
        /// Offending field.
        value: String,
    },

    /// The file has a header but no rows.
    #[error("'{0}' has no data rows")]
    Empty(PathBuf),

    /// Records handed to the writer are not strictly ascending.
    #[error(
        "record {} is not after {}",
        format_hour_stamp(*current),
        format_hour_stamp(*previous)
    )]
    Unordered {
        /// Timestamp of the preceding record.
        previous: DateTime<Utc>,
        /// Timestamp of the offending record.
        current: DateTime<Utc>,
    },
}
