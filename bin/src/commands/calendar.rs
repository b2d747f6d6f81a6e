//! Calendar command implementation.
//!
//! Counts the trading days of a market, the same count the downloader uses to
//! choose between compact and full daily history.

use crate::display::parse_date;
use anyhow::{Context, Result, bail};
use vantage_lib::prelude::*;

/// Show the trading days of a market between two dates.
pub(crate) fn show_calendar(market: &str, start: &str, end: &str, list: bool) -> Result<()> {
    let info = MarketHoursDatabase::global()
        .get(market)
        .with_context(|| format!("Unknown market: {market}"))?;

    let first = parse_date(start)?;
    let last = parse_date(end)?;
    if last < first {
        bail!("End date {last} precedes start date {first}");
    }

    if list {
        for date in first.iter_days().take_while(|date| *date <= last) {
            if info.is_open(date) {
                println!("{date}");
            }
        }
    }

    let days = info.trading_days(first, last);
    let size = if days > vantage_lib::COMPACT_TRADING_DAYS {
        "full"
    } else {
        "compact"
    };

    println!("Market:       {} ({})", info.name(), info.timezone().name());
    println!("Range:        {first} -> {last}");
    println!("Trading days: {days}");
    println!("Daily output: {size}");
    if !info.covers(first) || !info.covers(last) {
        let known = info
            .holiday_years()
            .map_or_else(|| "none".to_string(), |(from, to)| format!("{from}-{to}"));
        println!("Warning:      holidays only known for {known}; count may be high");
    }
    Ok(())
}
