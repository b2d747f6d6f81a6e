//! UTC query ranges and their monthly slices.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A UTC time range for data retrieval, inclusive at both ends.
///
/// A range whose end precedes its start is degenerate: it is representable
/// but covers no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start time (inclusive).
    pub start: DateTime<Utc>,
    /// End time (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new time range.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if the end precedes the start.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.end < self.start
    }

    /// Returns the monthly slices covering the range, oldest first.
    pub fn months(&self) -> MonthIterator {
        MonthIterator::new(self.start, self.end)
    }

    /// Converts both ends into naive local times of the given zone.
    #[must_use]
    pub fn to_local(&self, tz: Tz) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.start.with_timezone(&tz).naive_local(),
            self.end.with_timezone(&tz).naive_local(),
        )
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A year-month token identifying one monthly partition of intraday history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl YearMonth {
    /// Creates a year-month token.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Returns the month containing the given instant.
    #[must_use]
    pub fn of(time: DateTime<Utc>) -> Self {
        Self::new(time.year(), time.month())
    }

    /// Returns the following month.
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Iterator over the months touched by a UTC range.
///
/// Yields the month containing the start first and the month containing the
/// end last. At least one month is always produced.
#[derive(Debug, Clone)]
pub struct MonthIterator {
    current: Option<YearMonth>,
    last: YearMonth,
}

impl MonthIterator {
    /// Creates a new month iterator for the given bounds.
    fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let first = YearMonth::of(start);
        // A degenerate range still plans the start month.
        let last = YearMonth::of(end).max(first);

        Self {
            current: Some(first),
            last,
        }
    }
}

impl Iterator for MonthIterator {
    type Item = YearMonth;

    fn next(&mut self) -> Option<Self::Item> {
        let month = self.current?;
        self.current = (month < self.last).then(|| month.succ());
        Some(month)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(current) = self.current else {
            return (0, Some(0));
        };
        let months = (self.last.year - current.year) * 12 + self.last.month as i32
            - current.month as i32
            + 1;
        let months = months.max(0) as usize;
        (months, Some(months))
    }
}

impl ExactSizeIterator for MonthIterator {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_degenerate_range() {
        let range = TimeRange::new(utc(2024, 1, 31, 0), utc(2024, 1, 1, 0));
        assert!(range.is_degenerate());
        assert!(!TimeRange::new(utc(2024, 1, 1, 0), utc(2024, 1, 1, 0)).is_degenerate());
    }

    #[test]
    fn test_single_month() {
        let range = TimeRange::new(utc(2024, 3, 2, 0), utc(2024, 3, 30, 0));
        let months: Vec<_> = range.months().collect();

        assert_eq!(months, vec![YearMonth::new(2024, 3)]);
        assert_eq!(range.months().len(), 1);
    }

    #[test]
    fn test_months_across_year_end() {
        let range = TimeRange::new(utc(2023, 11, 15, 0), utc(2024, 2, 1, 0));
        let months: Vec<String> = range.months().map(|m| m.to_string()).collect();

        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert_eq!(range.months().len(), 4);
    }

    #[test]
    fn test_months_include_end_month() {
        // End on the first instant of a month still plans that month.
        let range = TimeRange::new(utc(2024, 1, 31, 23), utc(2024, 2, 1, 0));
        let months: Vec<_> = range.months().collect();
        assert_eq!(months, vec![YearMonth::new(2024, 1), YearMonth::new(2024, 2)]);
    }

    #[test]
    fn test_to_local() {
        let range = TimeRange::new(utc(2024, 1, 15, 14), utc(2024, 7, 15, 14));
        let (start, end) = range.to_local(chrono_tz::America::New_York);

        assert_eq!(start.hour(), 9); // EST, UTC-5
        assert_eq!(end.hour(), 10); // EDT, UTC-4
    }

    #[test]
    fn test_year_month_display() {
        assert_eq!(YearMonth::new(2021, 4).to_string(), "2021-04");
        assert_eq!(YearMonth::new(2021, 12).succ(), YearMonth::new(2022, 1));
    }
}
