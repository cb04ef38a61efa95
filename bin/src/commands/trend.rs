//! Trend command implementation.

use crate::display::format_trend;
use anyhow::{Context, Result};
use maline_lib::{ma_trend, parse_hour_stamp, read_records};
use std::path::Path;

/// Prints the MA30/MA60 trend at `timestamp` from the feed at `input`.
pub(crate) async fn show_trend(timestamp: &str, input: &Path) -> Result<()> {
    let at = parse_hour_stamp(timestamp)
        .with_context(|| format!("invalid hour '{timestamp}', expected YYYYMMDDhh, e.g. 2025012816"))?;

    let records = read_records(input)
        .await
        .with_context(|| format!("failed to load feed {}", input.display()))?;
    let trend = ma_trend(&records, at)?;

    println!("{}", format_trend(&trend));
    Ok(())
}
