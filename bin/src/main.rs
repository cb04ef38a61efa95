//! maline CLI - Hourly MA30/MA60 feeds from OKX candle history.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use maline_lib::{Bar, DEFAULT_INSTRUMENT};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

/// Default feed file, shared by `fetch` and `trend`.
const DEFAULT_OUTPUT: &str = "sol_usdt_ma.csv";

#[derive(Parser)]
#[command(name = "maline")]
#[command(about = "Hourly MA30/MA60 feeds from OKX candle history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch candle history and write the MA30/MA60 feed
    Fetch {
        /// Instrument ID
        #[arg(long, default_value = DEFAULT_INSTRUMENT)]
        inst_id: String,

        /// Bar interval (1m, 5m, 15m, 30m, 1H, 4H, 1D)
        #[arg(long, default_value = "1H")]
        bar: Bar,

        /// Days of history to emit
        #[arg(long, default_value = "30")]
        days: u32,

        /// Output CSV path
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,

        /// Retries per request after the first attempt
        #[arg(long, default_value = "3")]
        retries: u32,

        /// OKX API base URL
        #[arg(long, default_value = "https://www.okx.com")]
        base_url: String,

        /// HTTP/HTTPS proxy, e.g. http://127.0.0.1:7890
        #[arg(long)]
        proxy: Option<String>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,

        /// Candles per page (1-100)
        #[arg(long, default_value = "100")]
        page_limit: u32,
    },

    /// Show the first hours covered by MA30 and MA60 ending at an hour
    Starts {
        /// Hour stamp (YYYYMMDDhh)
        timestamp: String,
    },

    /// Show the MA30/MA60 trend at an hour from a feed file
    Trend {
        /// Hour stamp (YYYYMMDDhh)
        timestamp: String,

        /// Feed CSV path
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        input: PathBuf,
    },
}

/// Installs the log subscriber. `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Fetch {
            inst_id,
            bar,
            days,
            output,
            timeout,
            retries,
            base_url,
            proxy,
            insecure,
            page_limit,
        } => {
            let args = commands::fetch::FetchArgs {
                inst_id,
                bar,
                days,
                output,
                timeout,
                retries,
                base_url,
                proxy,
                insecure,
                page_limit,
            };
            commands::fetch::fetch(args, cli.quiet).await
        }
        Commands::Starts { timestamp } => commands::starts::show_starts(&timestamp),
        Commands::Trend { timestamp, input } => commands::trend::show_trend(&timestamp, &input).await,
    }
}
