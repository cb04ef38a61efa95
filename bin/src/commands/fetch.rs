//! Fetch command implementation.
//!
//! Paginates OKX candle history, aggregates it into MA30/MA60 rows and writes
//! the feed atomically.

use crate::display::{describe_feed_error, page_progress};
use anyhow::{Context, Result, anyhow};
use maline_lib::prelude::*;
use maline_lib::format_hour_stamp;
use std::path::PathBuf;
use std::time::Duration;

/// Flags of the `fetch` command.
pub(crate) struct FetchArgs {
    pub(crate) inst_id: String,
    pub(crate) bar: Bar,
    pub(crate) days: u32,
    pub(crate) output: PathBuf,
    pub(crate) timeout: u64,
    pub(crate) retries: u32,
    pub(crate) base_url: String,
    pub(crate) proxy: Option<String>,
    pub(crate) insecure: bool,
    pub(crate) page_limit: u32,
}

impl FetchArgs {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
            max_retries: self.retries,
            proxy: self.proxy.clone(),
            insecure: self.insecure,
            ..Default::default()
        }
    }

    fn plan(&self) -> Result<FeedPlan> {
        let lookback =
            LookbackWindow::days(self.days).with_context(|| format!("invalid --days {}", self.days))?;
        if !(1..=100).contains(&self.page_limit) {
            return Err(anyhow!(
                "--page-limit must be between 1 and 100, got {}",
                self.page_limit
            ));
        }
        Ok(
            FeedPlan::new(InstrumentId::new(&self.inst_id), self.bar, lookback)
                .with_page_limit(self.page_limit),
        )
    }
}

/// Fetches history and writes the MA feed.
pub(crate) async fn fetch(args: FetchArgs, quiet: bool) -> Result<()> {
    let plan = args.plan()?;
    let config = args.client_config();
    let policy = config.retry_policy();
    let client = OkxClient::new(config).context("failed to create HTTP client")?;

    if args.insecure {
        tracing::warn!("TLS certificate verification is disabled");
    }

    let progress = page_progress(
        plan.history_request().expected_pages(),
        format!("{} {} last {}", plan.instrument, plan.bar.as_str(), plan.lookback),
        quiet,
    );

    let summary = run_feed(
        &client,
        &policy,
        &plan,
        chrono::Utc::now(),
        &args.output,
        |page| {
            progress.inc(1);
            progress.set_message(format!("{} candles in page {}", page.len(), page.index + 1));
        },
    )
    .await;

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            progress.abandon_with_message("failed");
            return Err(anyhow!(describe_feed_error(&e)));
        }
    };
    progress.finish_with_message(format!("{} pages, {} candles", summary.pages, summary.candles));

    if !quiet {
        println!(
            "Wrote {} rows ({} -> {}) to {}",
            summary.records,
            format_hour_stamp(summary.first),
            format_hour_stamp(summary.last),
            args.output.display()
        );
    }

    Ok(())
}
