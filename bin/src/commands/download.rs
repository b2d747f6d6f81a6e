//! Download command implementation.
//!
//! This module downloads bars through the rate-limited downloader and writes
//! them to the requested output format.

use crate::display::{Format, parse_instant, write_bars};
use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::Args;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use vantage_lib::prelude::*;

/// Arguments of the `download` command.
#[derive(Debug, Args)]
pub(crate) struct DownloadArgs {
    /// Ticker symbol (e.g., IBM, AAPL)
    symbol: String,

    /// Market of the listing
    #[arg(short, long, default_value = "usa")]
    market: String,

    /// Security type (only equity has data)
    #[arg(long, default_value = "equity")]
    security_type: SecurityType,

    /// Bar resolution (minute, hour, daily)
    #[arg(short, long, default_value = "daily")]
    resolution: Resolution,

    /// Start (YYYY-MM-DD or RFC 3339, UTC). Defaults to 30 days before the end.
    #[arg(short, long)]
    start: Option<String>,

    /// End (YYYY-MM-DD or RFC 3339, UTC), inclusive. Defaults to now.
    #[arg(short, long)]
    end: Option<String>,

    /// Output file path. Defaults to <symbol>_<resolution>.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// API price tier (free, 30, 75, 150, 300, 600, 1200)
    #[arg(long, env = "VANTAGE_PRICE_TIER", default_value = "free")]
    tier: PriceTier,

    /// API key
    #[arg(long, env = "VANTAGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "VANTAGE_BASE_URL")]
    base_url: Option<String>,

    /// Print the API calls that would be made and exit
    #[arg(long)]
    dry_run: bool,
}

/// Download bars for a symbol.
pub(crate) async fn download(args: DownloadArgs, quiet: bool) -> Result<()> {
    let end = match args.end.as_deref() {
        Some(s) => parse_instant(s, true)?,
        None => Utc::now(),
    };
    let start = match args.start.as_deref() {
        Some(s) => parse_instant(s, false)?,
        None => end - TimeDelta::days(30),
    };

    let instrument = Instrument::new(&args.symbol, &args.market, args.security_type);
    let request = HistoryRequest::new(instrument, args.resolution, start, end);

    let mut config = DownloaderConfig::new(args.api_key.unwrap_or_default()).with_price_tier(args.tier);
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    let downloader =
        HistoryDownloader::new(&config).context("Failed to create downloader (is VANTAGE_API_KEY set?)")?;

    if args.dry_run {
        for call in downloader.plan(&request)? {
            println!("{call}");
        }
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}_{}.{}",
            args.symbol.to_lowercase(),
            args.resolution,
            args.format.extension()
        ))
    });

    // Cancel at the next slice boundary on Ctrl+C.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current slice");
                cancel.cancel();
            }
        }
    });

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} bars {msg}")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!(
            "{} {} {} -> {}",
            request.instrument,
            request.resolution,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ));
        pb
    };

    let mut bars: Vec<Bar> = Vec::new();
    let mut stream = downloader.get_with_cancel(&request, cancel)?;

    while let Some(item) = stream.next().await {
        match item {
            Ok(bar) => {
                bars.push(bar);
                progress.inc(1);
            }
            Err(VantageError::Cancelled) => {
                progress.abandon_with_message(format!("Cancelled after {} bars", bars.len()));
                break;
            }
            Err(err) => {
                progress.abandon_with_message("Download failed");
                return Err(err).with_context(|| format!("Failed to download {}", request.instrument));
            }
        }
    }

    if !progress.is_finished() {
        progress.finish_with_message(format!("Downloaded {} bars", bars.len()));
    }
    info!(bars = bars.len(), output = %output.display(), "Writing output");

    write_bars(&bars, &output, args.format)?;

    if !quiet {
        println!("Output written to: {}", output.display());
    }

    Ok(())
}
