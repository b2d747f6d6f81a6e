//! Exchange calendars for the vantage historical bar downloader.
//!
//! This crate answers two questions about an instrument: which timezone its
//! exchange reports in, and whether the exchange is open on a given date.
//!
//! # Example
//!
//! ```
//! use vantage_calendar::{CalendarResolver, MarketHoursDatabase};
//! use vantage_types::Instrument;
//!
//! let database = MarketHoursDatabase::global();
//! if let Some(info) = database.get("usa") {
//!     println!("{}", info.timezone());
//! }
//!
//! let resolver = CalendarResolver::global();
//! let tz = resolver.resolve(&Instrument::equity("IBM")).unwrap();
//! assert_eq!(tz, chrono_tz::America::New_York);
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vantage-rs/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod resolver;

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;
use vantage_types::{Result, SecurityType, VantageError};

pub use resolver::CalendarResolver;

/// The market table embedded at compile time.
const MARKETS_JSON: &str = include_str!("../data/markets.json");

/// Global market database instance.
static DATABASE: OnceLock<MarketHoursDatabase> = OnceLock::new();

/// External source of exchange timezones and trading calendars.
pub trait ExchangeCalendar: Send + Sync + std::fmt::Debug {
    /// Returns the exchange information for an instrument.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrument's market is unknown.
    fn exchange_info(
        &self,
        market: &str,
        symbol: &str,
        security_type: SecurityType,
    ) -> Result<ExchangeInfo>;
}

impl<T: ExchangeCalendar + ?Sized> ExchangeCalendar for &T {
    fn exchange_info(
        &self,
        market: &str,
        symbol: &str,
        security_type: SecurityType,
    ) -> Result<ExchangeInfo> {
        (**self).exchange_info(market, symbol, security_type)
    }
}

/// Timezone and open/closed calendar of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeInfo {
    /// Display name of the market.
    #[serde(default)]
    name: String,
    /// IANA timezone the exchange reports in.
    timezone: Tz,
    /// Days of the week the exchange is closed.
    #[serde(default = "default_weekend")]
    weekend: Vec<Weekday>,
    /// Full-day closures.
    #[serde(default)]
    holidays: BTreeSet<NaiveDate>,
    /// First and last calendar year the holiday list is complete for.
    #[serde(default)]
    holiday_years: Option<(i32, i32)>,
}

fn default_weekend() -> Vec<Weekday> {
    vec![Weekday::Sat, Weekday::Sun]
}

impl ExchangeInfo {
    /// Creates exchange information with a Saturday/Sunday weekend.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        timezone: Tz,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            name: name.into(),
            timezone,
            weekend: default_weekend(),
            holidays: holidays.into_iter().collect(),
            holiday_years: None,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the exchange timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns the listed holidays.
    #[must_use]
    pub const fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }

    /// Returns the inclusive year range the holiday list covers, if recorded.
    #[must_use]
    pub const fn holiday_years(&self) -> Option<(i32, i32)> {
        self.holiday_years
    }

    /// Returns true if the holiday list is known to be complete for `date`.
    ///
    /// Calendars without a recorded range are taken at their word.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.holiday_years
            .is_none_or(|(first, last)| (first..=last).contains(&date.year()))
    }

    /// Returns true if the exchange trades on the given local date.
    #[must_use]
    pub fn is_open(&self, date: NaiveDate) -> bool {
        !self.weekend.contains(&date.weekday()) && !self.holidays.contains(&date)
    }

    /// Counts trading days between two local dates, both inclusive.
    #[must_use]
    pub fn trading_days(&self, first: NaiveDate, last: NaiveDate) -> usize {
        first
            .iter_days()
            .take_while(|date| *date <= last)
            .filter(|date| self.is_open(*date))
            .count()
    }
}

/// Table of markets and their exchange calendars.
#[derive(Debug)]
pub struct MarketHoursDatabase {
    markets: HashMap<String, ExchangeInfo>,
}

impl MarketHoursDatabase {
    /// Returns the global market database.
    ///
    /// The database is initialized lazily on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        DATABASE.get_or_init(Self::load)
    }

    /// Loads markets from the embedded JSON data.
    fn load() -> Self {
        Self::from_json(MARKETS_JSON).expect("Invalid markets.json")
    }

    /// Parses a market table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown timezone.
    pub fn from_json(json: &str) -> Result<Self> {
        let markets: HashMap<String, ExchangeInfo> = serde_json::from_str(json)?;
        let markets = markets
            .into_iter()
            .map(|(market, info)| (market.to_lowercase(), info))
            .collect();
        Ok(Self { markets })
    }

    /// Looks up a market by identifier (case-insensitive).
    #[must_use]
    pub fn get(&self, market: &str) -> Option<&ExchangeInfo> {
        self.markets.get(&market.to_lowercase())
    }

    /// Returns the total number of markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// Returns true if the database is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Returns all market identifiers sorted alphabetically.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.markets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ExchangeCalendar for MarketHoursDatabase {
    fn exchange_info(
        &self,
        market: &str,
        _symbol: &str,
        _security_type: SecurityType,
    ) -> Result<ExchangeInfo> {
        self.get(market)
            .cloned()
            .ok_or_else(|| VantageError::UnknownMarket(market.to_string()))
    }
}
