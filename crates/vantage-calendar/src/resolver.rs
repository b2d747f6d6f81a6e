//! Per-instrument caching of exchange calendars.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};
use vantage_types::{Instrument, Result};

use crate::{ExchangeCalendar, ExchangeInfo, MarketHoursDatabase};

/// Resolves instruments to their exchange calendars, caching each lookup.
///
/// The first lookup for an instrument queries the underlying
/// [`ExchangeCalendar`]; later lookups are served from the cache for the
/// lifetime of the resolver. Entries are never invalidated.
#[derive(Debug)]
pub struct CalendarResolver {
    calendar: Arc<dyn ExchangeCalendar>,
    cache: RwLock<HashMap<Instrument, Arc<ExchangeInfo>>>,
}

impl CalendarResolver {
    /// Creates a resolver backed by the given calendar.
    #[must_use]
    pub fn new(calendar: Arc<dyn ExchangeCalendar>) -> Self {
        Self {
            calendar,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a resolver backed by the embedded market database.
    #[must_use]
    pub fn global() -> Self {
        Self::new(Arc::new(MarketHoursDatabase::global()))
    }

    /// Returns the exchange information for an instrument.
    ///
    /// Concurrent first lookups may both query the calendar; the first insert
    /// wins and both callers observe identical data.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot resolve the instrument.
    pub fn exchange(&self, instrument: &Instrument) -> Result<Arc<ExchangeInfo>> {
        if let Some(info) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instrument)
        {
            return Ok(Arc::clone(info));
        }

        let info = Arc::new(self.calendar.exchange_info(
            instrument.market(),
            instrument.symbol(),
            instrument.security_type(),
        )?);
        debug!(%instrument, timezone = %info.timezone(), "resolved exchange calendar");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(instrument.clone()).or_insert(info)))
    }

    /// Returns the exchange timezone of an instrument.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot resolve the instrument.
    pub fn resolve(&self, instrument: &Instrument) -> Result<Tz> {
        self.exchange(instrument).map(|info| info.timezone())
    }

    /// Returns true if the instrument's exchange trades on the local date.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot resolve the instrument.
    pub fn is_trading_day(&self, instrument: &Instrument, date: NaiveDate) -> Result<bool> {
        let info = self.exchange(instrument)?;
        warn_uncovered(instrument, &info, date, date);
        Ok(info.is_open(date))
    }

    /// Counts trading days between two local dates, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot resolve the instrument.
    pub fn trading_day_count(
        &self,
        instrument: &Instrument,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<usize> {
        let info = self.exchange(instrument)?;
        warn_uncovered(instrument, &info, first, last);
        Ok(info.trading_days(first, last))
    }

    /// Returns the number of cached instruments.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Logs when a date range reaches outside the years the holiday list covers.
fn warn_uncovered(instrument: &Instrument, info: &ExchangeInfo, first: NaiveDate, last: NaiveDate) {
    if info.covers(first) && info.covers(last) {
        return;
    }
    warn!(
        %instrument,
        %first,
        %last,
        holiday_years = ?info.holiday_years(),
        "holiday calendar does not cover the requested dates; only weekends are excluded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vantage_types::{SecurityType, VantageError};

    /// Calendar that counts how often it is queried.
    #[derive(Debug, Default)]
    struct CountingCalendar {
        lookups: AtomicUsize,
    }

    impl ExchangeCalendar for CountingCalendar {
        fn exchange_info(
            &self,
            market: &str,
            symbol: &str,
            security_type: SecurityType,
        ) -> Result<ExchangeInfo> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            MarketHoursDatabase::global().exchange_info(market, symbol, security_type)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_caches_per_instrument() {
        let calendar = Arc::new(CountingCalendar::default());
        let resolver = CalendarResolver::new(calendar.clone());
        let ibm = Instrument::equity("IBM");

        assert_eq!(resolver.resolve(&ibm).unwrap(), chrono_tz::America::New_York);
        assert_eq!(resolver.resolve(&ibm).unwrap(), chrono_tz::America::New_York);
        assert!(resolver.is_trading_day(&ibm, date(2021, 4, 5)).unwrap());
        assert_eq!(calendar.lookups.load(Ordering::SeqCst), 1);

        resolver.resolve(&Instrument::equity("AAPL")).unwrap();
        assert_eq!(calendar.lookups.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached(), 2);
    }

    #[test]
    fn test_unknown_market_is_not_cached() {
        let resolver = CalendarResolver::global();
        let unknown = Instrument::new("IBM", "mars", SecurityType::Equity);

        let err = resolver.resolve(&unknown).unwrap_err();
        assert!(matches!(err, VantageError::UnknownMarket(_)));
        assert_eq!(resolver.cached(), 0);
    }

    #[test]
    fn test_trading_day_count() {
        let resolver = CalendarResolver::global();
        let ibm = Instrument::equity("IBM");

        // Calendar year 2021 on NYSE: 261 weekdays, 9 weekday holidays.
        let count = resolver
            .trading_day_count(&ibm, date(2021, 1, 1), date(2021, 12, 31))
            .unwrap();
        assert_eq!(count, 252);
    }

    #[test]
    fn test_trading_day_count_outside_holiday_years() {
        let resolver = CalendarResolver::global();
        let ibm = Instrument::equity("IBM");

        // January 2018 predates the holiday list: New Year and MLK Day count.
        let count = resolver
            .trading_day_count(&ibm, date(2018, 1, 1), date(2018, 1, 31))
            .unwrap();
        assert_eq!(count, 23);
        assert!(resolver.is_trading_day(&ibm, date(2018, 1, 1)).unwrap());
    }

    #[test]
    fn test_concurrent_first_resolution() {
        let calendar = Arc::new(CountingCalendar::default());
        let resolver = Arc::new(CalendarResolver::new(calendar));
        let ibm = Instrument::equity("IBM");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let ibm = ibm.clone();
                std::thread::spawn(move || resolver.resolve(&ibm).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), chrono_tz::America::New_York);
        }
        assert_eq!(resolver.cached(), 1);
    }
}
