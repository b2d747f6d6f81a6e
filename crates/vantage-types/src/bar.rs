//! Raw response records and normalized bars.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// One OHLCV row as parsed from a quote API response.
///
/// The timestamp is naive: intraday rows carry a date-time, daily rows a date
/// at midnight. Both are interpreted as exchange-local during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Row timestamp in the API's time base.
    pub timestamp: NaiveDateTime,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl RawRecord {
    /// Creates a new raw record.
    #[must_use]
    pub const fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Converts the record into a bar with the given period.
    #[must_use]
    pub const fn into_bar(self, period: TimeDelta) -> Bar {
        Bar {
            time: self.timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            period,
        }
    }
}

/// OHLCV bar in exchange-local time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time in the exchange's local zone.
    pub time: NaiveDateTime,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Bar duration.
    #[serde(with = "period_seconds")]
    pub period: TimeDelta,
}

/// Serializes a period as whole seconds.
mod period_seconds {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(period: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(period.num_seconds())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TimeDelta, D::Error> {
        i64::deserialize(d).map(TimeDelta::seconds)
    }
}
