//! Bar resolutions and tick types.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Resolution of requested bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Tick-by-tick data. Never served by the quote API.
    Tick,
    /// 1-second bars. Never served by the quote API.
    Second,
    /// 1-minute bars.
    Minute,
    /// 1-hour bars.
    Hour,
    /// Daily bars.
    #[default]
    Daily,
}

impl Resolution {
    /// Returns the fixed bar duration, or None for tick data.
    #[must_use]
    pub const fn period(&self) -> Option<TimeDelta> {
        match self {
            Self::Tick => None,
            Self::Second => Some(TimeDelta::seconds(1)),
            Self::Minute => Some(TimeDelta::minutes(1)),
            Self::Hour => Some(TimeDelta::hours(1)),
            Self::Daily => Some(TimeDelta::days(1)),
        }
    }

    /// Returns true if the quote API can serve this resolution.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Minute | Self::Hour | Self::Daily)
    }

    /// Returns the `interval` marker of an intraday request.
    #[must_use]
    pub const fn interval(&self) -> Option<&'static str> {
        match self {
            Self::Minute => Some("1min"),
            Self::Hour => Some("60min"),
            _ => None,
        }
    }

    /// Returns the resolution as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Daily => "daily",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tick" => Ok(Self::Tick),
            "second" | "s1" | "1s" => Ok(Self::Second),
            "minute" | "m1" | "1m" | "1min" => Ok(Self::Minute),
            "hour" | "h1" | "1h" | "60min" => Ok(Self::Hour),
            "daily" | "day" | "d1" | "1d" => Ok(Self::Daily),
            _ => Err(ResolutionParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid resolution string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionParseError(String);

impl std::fmt::Display for ResolutionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid resolution '{}', expected one of: tick, second, minute, hour, daily",
            self.0
        )
    }
}

impl std::error::Error for ResolutionParseError {}

/// Kind of market data a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TickType {
    /// Trade prints (the only kind served by the quote API).
    #[default]
    Trade,
    /// Bid/ask quotes.
    Quote,
    /// Open interest.
    OpenInterest,
}
