//! Conversion of raw records into exchange-local bars.

use chrono::{NaiveDateTime, TimeDelta};
use chrono_tz::Tz;
use vantage_types::{Bar, RawRecord, TimeRange};

/// Filters records to a query range and turns them into bars.
///
/// The UTC range is converted to exchange-local time once, at construction.
/// A record is kept when `start <= timestamp <= end` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarNormalizer {
    start: NaiveDateTime,
    end: NaiveDateTime,
    period: TimeDelta,
}

impl BarNormalizer {
    /// Creates a normalizer for `range` in the exchange zone `tz`.
    #[must_use]
    pub fn new(range: &TimeRange, tz: Tz, period: TimeDelta) -> Self {
        let (start, end) = range.to_local(tz);
        Self { start, end, period }
    }

    /// Local start of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Local end of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Bar period.
    #[must_use]
    pub const fn period(&self) -> TimeDelta {
        self.period
    }

    /// Returns true if the local timestamp falls within the range.
    #[must_use]
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// Converts a record into a bar, or `None` if it is out of range.
    #[must_use]
    pub fn normalize(&self, record: RawRecord) -> Option<Bar> {
        self.contains(record.timestamp)
            .then(|| record.into_bar(self.period))
    }

    /// Normalizes a batch, preserving input order.
    pub fn normalize_all(&self, records: Vec<RawRecord>) -> Vec<Bar> {
        records
            .into_iter()
            .filter_map(|record| self.normalize(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::America::New_York;

    fn local(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 4, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn record(timestamp: NaiveDateTime) -> RawRecord {
        RawRecord::new(timestamp, 1.0, 2.0, 0.5, 1.5, 100.0)
    }

    fn normalizer() -> BarNormalizer {
        // 14:00-18:00 UTC is 10:00-14:00 in New York (EDT).
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2021, 4, 6, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 4, 6, 18, 0, 0).unwrap(),
        );
        BarNormalizer::new(&range, New_York, TimeDelta::hours(1))
    }

    #[test]
    fn test_local_bounds() {
        let normalizer = normalizer();
        assert_eq!(normalizer.start(), local(6, 10, 0));
        assert_eq!(normalizer.end(), local(6, 14, 0));
    }

    #[test]
    fn test_bounds_inclusive() {
        let normalizer = normalizer();
        assert!(normalizer.normalize(record(local(6, 10, 0))).is_some());
        assert!(normalizer.normalize(record(local(6, 14, 0))).is_some());
        assert!(normalizer.normalize(record(local(6, 9, 59))).is_none());
        assert!(normalizer.normalize(record(local(6, 14, 1))).is_none());
    }

    #[test]
    fn test_bar_carries_period() {
        let bar = normalizer().normalize(record(local(6, 11, 0))).unwrap();
        assert_eq!(bar.time, local(6, 11, 0));
        assert_eq!(bar.period, TimeDelta::hours(1));
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let records = vec![
            record(local(6, 9, 0)),
            record(local(6, 10, 0)),
            record(local(6, 12, 0)),
            record(local(6, 12, 0)),
            record(local(6, 15, 0)),
        ];
        let bars = normalizer().normalize_all(records);
        let times: Vec<NaiveDateTime> = bars.iter().map(|bar| bar.time).collect();
        assert_eq!(times, [local(6, 10, 0), local(6, 12, 0), local(6, 12, 0)]);
    }
}
