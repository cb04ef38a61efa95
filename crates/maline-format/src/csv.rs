//! CSV output format.

use maline_types::{MaRecord, format_hour_stamp};
use std::io::Write;

use crate::FormatError;

/// Header row of the feed.
pub const CSV_HEADER: &str = "timestamp,ma30,ma60";

/// CSV formatter for MA records.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a formatter that writes the header row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_header: true,
        }
    }

    /// Sets whether to include the header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Writes records as `YYYYMMDDhh,ma30,ma60` lines.
    ///
    /// Averages are written as stored; the aggregator already rounds them to
    /// one fractional digit.
    ///
    /// # Errors
    ///
    /// Returns an error if the records are not strictly ascending by
    /// timestamp or the writer fails. Ordering is checked before anything is
    /// written.
    pub fn write_records<W: Write>(
        &self,
        records: &[MaRecord],
        mut writer: W,
    ) -> Result<(), FormatError> {
        if let Some(pair) = records.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(FormatError::Unordered {
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }

        if self.include_header {
            writeln!(writer, "{CSV_HEADER}")?;
        }

        for record in records {
            writeln!(
                writer,
                "{},{},{}",
                format_hour_stamp(record.timestamp),
                record.ma30,
                record.ma60
            )?;
        }

        Ok(())
    }
}
