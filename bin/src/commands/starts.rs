//! Starts command implementation.

use crate::display::format_starts;
use anyhow::{Context, Result};
use maline_lib::{Bar, ma_start_dates, parse_hour_stamp};

/// Prints the first hours covered by MA30 and MA60 ending at `timestamp`.
pub(crate) fn show_starts(timestamp: &str) -> Result<()> {
    let end = parse_hour_stamp(timestamp)
        .with_context(|| format!("invalid hour '{timestamp}', expected YYYYMMDDhh, e.g. 2025012816"))?;

    let starts = ma_start_dates(end, Bar::Hour1);
    println!("{}", format_starts(timestamp.trim(), &starts));
    Ok(())
}
