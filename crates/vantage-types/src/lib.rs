//! Core types for the vantage historical bar downloader.
//!
//! This crate provides the fundamental data structures used throughout vantage:
//!
//! - [`Instrument`] - Symbol, market and security type of a traded instrument
//! - [`Resolution`] - Bar resolution and its fixed period
//! - [`TimeRange`] - UTC query range and its monthly [`YearMonth`] slices
//! - [`RawRecord`] - One parsed response row
//! - [`Bar`] - Normalized OHLCV bar in exchange-local time

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vantage-rs/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod error;
mod instrument;
mod resolution;
mod time_range;

pub use bar::{Bar, RawRecord};
pub use error::{Result, VantageError};
pub use instrument::{Instrument, SecurityType};
pub use resolution::{Resolution, ResolutionParseError, TickType};
pub use time_range::{MonthIterator, TimeRange, YearMonth};
