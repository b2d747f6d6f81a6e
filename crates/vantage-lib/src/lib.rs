//! Rust library for downloading historical equity bars from the Alpha Vantage API.
//!
//! This is a facade crate that re-exports functionality from the vantage
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use vantage_lib::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = HistoryDownloader::new(&DownloaderConfig::from_env()?)?;
//!     let request = HistoryRequest::new(
//!         Instrument::equity("IBM"),
//!         Resolution::Minute,
//!         chrono::Utc::now() - chrono::TimeDelta::days(30),
//!         chrono::Utc::now(),
//!     );
//!
//!     let mut bars = downloader.get(&request)?;
//!     while let Some(bar) = bars.next().await {
//!         let bar = bar?;
//!         println!("{} close {}", bar.time, bar.close);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vantage-rs/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use vantage_types::*;

// Re-export exchange calendars
pub use vantage_calendar::{CalendarResolver, ExchangeCalendar, ExchangeInfo, MarketHoursDatabase};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use vantage_fetch::{
    BarStream, COMPACT_TRADING_DAYS, CancellationToken, ClientConfig, DownloadError,
    DownloaderConfig, HistoryDownloader, HistoryRequest, HttpTransport, PriceTier, RateLimiter,
    RequestExecutor, request::QueryRequest,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use vantage_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

/// Prelude module for convenient imports.
///
/// ```
/// use vantage_lib::prelude::*;
/// ```
pub mod prelude {
    pub use vantage_types::{
        Bar, Instrument, Resolution, Result, SecurityType, TickType, TimeRange, VantageError,
        YearMonth,
    };

    pub use vantage_calendar::{CalendarResolver, MarketHoursDatabase};

    #[cfg(feature = "fetch")]
    pub use vantage_fetch::{
        BarStream, CancellationToken, DownloaderConfig, HistoryDownloader, HistoryRequest,
        PriceTier,
    };

    #[cfg(feature = "format")]
    pub use vantage_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};
}
