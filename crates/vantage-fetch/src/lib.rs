//! Request planning and download for the vantage historical bar downloader.
//!
//! This crate provides the download pipeline:
//!
//! - [`RateLimiter`] - Evenly spaced request gate shared by every request, sized by [`PriceTier`]
//! - [`request::QueryRequest`] - Daily and monthly intraday API calls
//! - [`RequestExecutor`] - Rate-limited execution, content checks and CSV parsing
//! - [`BarNormalizer`] - Exchange-local range filtering
//! - [`HistoryDownloader`] - Lazy [`BarStream`] for a [`HistoryRequest`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vantage-rs/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod downloader;
mod executor;
mod normalize;
mod parse;
mod rate_limit;
pub mod request;

#[cfg(test)]
mod testing;

pub use client::{
    ClientConfig, DOWNLOAD_CONTENT_TYPE, DownloadError, HttpRequest, HttpResponse, HttpTransport,
    ReqwestTransport,
};
pub use config::{API_KEY_VAR, BASE_URL_VAR, DownloaderConfig, PRICE_TIER_VAR};
pub use downloader::{BarStream, COMPACT_TRADING_DAYS, HistoryDownloader, HistoryRequest};
pub use executor::RequestExecutor;
pub use normalize::BarNormalizer;
pub use parse::{parse_records, parse_timestamp};
pub use rate_limit::{PriceTier, PriceTierParseError, QUOTA_WINDOW, RateLimiter};
pub use tokio_util::sync::CancellationToken;
