//! vantage CLI - historical equity bar downloader.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::download::DownloadArgs;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Historical equity bar downloader for the Alpha Vantage API", long_about = None)]
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
    /// Download historical bars for an equity
    Download(DownloadArgs),

    /// List markets with a known exchange calendar
    Markets,

    /// Count trading days of a market between two dates
    Calendar {
        /// Market identifier (e.g., usa, uk)
        market: String,

        /// First date (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Last date (YYYY-MM-DD), inclusive
        #[arg(short, long)]
        end: String,

        /// Print every trading day
        #[arg(long)]
        list: bool,
    },
}

/// Installs the log subscriber. `RUST_LOG` takes precedence over `-v`.
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
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Download(args) => commands::download::download(args, cli.quiet).await,
        Commands::Markets => commands::markets::list_markets(),
        Commands::Calendar {
            market,
            start,
            end,
            list,
        } => commands::calendar::show_calendar(&market, &start, &end, list),
    }
}
