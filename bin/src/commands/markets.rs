//! Markets command implementation.

use anyhow::Result;
use vantage_lib::prelude::*;

/// List markets with a known exchange calendar.
pub(crate) fn list_markets() -> Result<()> {
    let database = MarketHoursDatabase::global();

    if database.is_empty() {
        println!("No markets found.");
        return Ok(());
    }

    println!("{:<10} {:<20} {:<12} NAME", "ID", "TIMEZONE", "HOLIDAYS");
    println!("{}", "-".repeat(70));

    for id in database.ids() {
        if let Some(info) = database.get(id) {
            let years = info
                .holiday_years()
                .map_or_else(|| "-".to_string(), |(from, to)| format!("{from}-{to}"));
            println!(
                "{:<10} {:<20} {:<12} {}",
                id,
                info.timezone().name(),
                years,
                info.name()
            );
        }
    }

    println!("\nTotal: {} markets", database.len());
    Ok(())
}
