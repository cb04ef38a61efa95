//! CSV input.

use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::StreamExt;
use maline_types::{MaRecord, parse_hour_stamp};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::FormatError;

const COLUMNS: [&str; 3] = ["timestamp", "ma30", "ma60"];

/// Reads a `timestamp,ma30,ma60` feed.
///
/// Columns are located by header name, so extra columns and any column order
/// are accepted. Fields are trimmed. The result is sorted by timestamp.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is missing,
/// a row holds an invalid hour stamp or number, or there are no rows. Row
/// errors carry the 1-based line number.
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<MaRecord>, FormatError> {
    let path = path.as_ref();
    let csv_error = |source| FormatError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_reader(file);

    let headers = reader.headers().await.map_err(csv_error)?;
    let positions = COLUMNS.map(|name| headers.iter().position(|h| h == name));
    let [Some(ts), Some(ma30), Some(ma60)] = positions else {
        let missing: Vec<&str> = COLUMNS
            .iter()
            .zip(positions)
            .filter(|(_, position)| position.is_none())
            .map(|(name, _)| *name)
            .collect();
        return Err(FormatError::MissingColumns {
            path: path.to_path_buf(),
            missing: missing.join(", "),
        });
    };

    let mut records = Vec::new();
    let mut rows = reader.records();
    while let Some(row) = rows.next().await {
        let row = row.map_err(csv_error)?;
        let line = row.position().map_or(records.len() as u64 + 2, |p| p.line());
        records.push(parse_row(&row, line, [ts, ma30, ma60])?);
    }

    if records.is_empty() {
        return Err(FormatError::Empty(path.to_path_buf()));
    }

    records.sort_by_key(|record| record.timestamp);
    debug!(path = %path.display(), rows = records.len(), "feed loaded");
    Ok(records)
}

fn parse_row(
    row: &StringRecord,
    line: u64,
    [ts, ma30, ma60]: [usize; 3],
) -> Result<MaRecord, FormatError> {
    let field = |index: usize| row.get(index).unwrap_or_default();

    let timestamp = parse_hour_stamp(field(ts)).map_err(|_| FormatError::Timestamp {
        line,
        value: field(ts).to_string(),
    })?;
    let number = |index: usize, name: &'static str| {
        Decimal::from_str(field(index)).map_err(|_| FormatError::Number {
            line,
            field: name,
            value: field(index).to_string(),
        })
    };

    Ok(MaRecord::new(
        timestamp,
        number(ma30, "ma30")?,
        number(ma60, "ma60")?,
    ))
}
