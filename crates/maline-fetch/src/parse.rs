//! Typed parsing of `history-candles` responses.

use chrono::DateTime;
use maline_types::{Bar, Candle};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

use crate::FetchError;

/// Index of the bar open timestamp in a candle row.
const TS_FIELD: usize = 0;
/// Index of the close price in a candle row.
const CLOSE_FIELD: usize = 4;

/// Errors that can occur while parsing a response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The body is not a JSON envelope of the expected shape.
    #[error("invalid response body: {0}")]
    Body(String),

    /// A candle row has too few fields.
    #[error("row {row}: expected at least {expected} fields, got {got}")]
    ShortRow {
        /// Zero-based row index.
        row: usize,
        /// Minimum field count.
        expected: usize,
        /// Actual field count.
        got: usize,
    },

    /// A candle row has an unparseable timestamp.
    #[error("row {row}: invalid timestamp '{value}'")]
    Timestamp {
        /// Zero-based row index.
        row: usize,
        /// The offending value.
        value: String,
    },

    /// A candle row has an unparseable close price.
    #[error("row {row}: invalid close price '{value}'")]
    Price {
        /// Zero-based row index.
        row: usize,
        /// The offending value.
        value: String,
    },
}

/// Response envelope shared by OKX REST endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

/// Parses a `history-candles` response body into candles.
///
/// Rows are `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`; only the
/// open timestamp and the close are kept. The close time is the open time
/// plus one `bar`. Row order is preserved (newest first).
///
/// # Errors
///
/// Returns [`FetchError::Api`] if the exchange reports a non-zero code, and
/// [`FetchError::Parse`] if the body does not match the schema.
pub fn parse_candles(body: &[u8], bar: Bar) -> Result<Vec<Candle>, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| ParseError::Body(e.to_string()))?;

    if envelope.code != "0" {
        let message = if envelope.msg.is_empty() {
            "unknown error".to_string()
        } else {
            envelope.msg
        };
        return Err(FetchError::Api {
            code: envelope.code,
            message,
        });
    }

    let candles = envelope
        .data
        .iter()
        .enumerate()
        .map(|(row, fields)| parse_row(row, fields, bar))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(candles)
}

/// Parses a single candle row.
fn parse_row(row: usize, fields: &[String], bar: Bar) -> Result<Candle, ParseError> {
    if fields.len() <= CLOSE_FIELD {
        return Err(ParseError::ShortRow {
            row,
            expected: CLOSE_FIELD + 1,
            got: fields.len(),
        });
    }

    let raw_ts = &fields[TS_FIELD];
    let open_time = raw_ts
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| ParseError::Timestamp {
            row,
            value: raw_ts.clone(),
        })?;

    let raw_close = &fields[CLOSE_FIELD];
    let close = Decimal::from_str(raw_close).map_err(|_| ParseError::Price {
        row,
        value: raw_close.clone(),
    })?;

    Ok(Candle::new(open_time + bar.duration(), close))
}
