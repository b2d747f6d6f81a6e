//! CSV parsing for quote API responses.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv_async::{AsyncReaderBuilder, Trim};
use futures::TryStreamExt;
use serde::Deserialize;
use vantage_types::{RawRecord, Result, VantageError};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One CSV row. Daily files name the first column `timestamp`, intraday
/// files name it `time`.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(alias = "time")]
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Parses a CSV body into raw records, in file order.
///
/// # Errors
///
/// Returns [`VantageError::Parse`] if a row is malformed.
pub async fn parse_records(body: &str) -> Result<Vec<RawRecord>> {
    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_deserializer(body.as_bytes());

    let rows: Vec<Row> = reader
        .deserialize::<Row>()
        .try_collect()
        .await
        .map_err(|e| VantageError::Parse(e.to_string()))?;

    rows.into_iter()
        .map(|row| {
            Ok(RawRecord::new(
                parse_timestamp(&row.timestamp)?,
                row.open,
                row.high,
                row.low,
                row.close,
                row.volume,
            ))
        })
        .collect()
}

/// Parses an exchange-local timestamp. Date-only values map to midnight.
///
/// # Errors
///
/// Returns [`VantageError::Parse`] if the value matches neither format.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| VantageError::Parse(format!("invalid timestamp: {value}")))
}
