//! Display utilities and output formatting for the maline CLI.

use indicatif::{ProgressBar, ProgressStyle};
use maline_lib::{FeedError, MaStartDates, MaTrend, format_hour_stamp};

/// Creates the page progress bar, hidden in quiet mode.
pub(crate) fn page_progress(expected_pages: usize, message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(expected_pages as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_message(message);
    pb
}

/// One-line diagnostic naming the error kind and, for failed requests, the
/// attempts made.
pub(crate) fn describe_feed_error(error: &FeedError) -> String {
    match error.attempts() {
        Some(attempts) => format!("{} after {attempts} attempt(s): {error}", error.kind()),
        None => format!("{}: {error}", error.kind()),
    }
}

/// Renders MA start hours.
pub(crate) fn format_starts(input: &str, starts: &MaStartDates) -> String {
    format!(
        "Input:      {input}\nMA30 start: {}\nMA60 start: {}",
        format_hour_stamp(starts.ma30_start),
        format_hour_stamp(starts.ma60_start)
    )
}

/// Renders an MA trend.
pub(crate) fn format_trend(trend: &MaTrend) -> String {
    format!(
        "Input:    {}\nLatest:   {}\nPrevious: {}\nMA30: {} -> {} ({})\nMA60: {} -> {} ({})",
        format_hour_stamp(trend.at),
        format_hour_stamp(trend.latest.timestamp),
        format_hour_stamp(trend.previous.timestamp),
        trend.previous.ma30,
        trend.latest.ma30,
        trend.ma30,
        trend.previous.ma60,
        trend.latest.ma60,
        trend.ma60,
    )
}
