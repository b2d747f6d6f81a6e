//! Instrument identity used for requests and calendar lookups.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Security type of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecurityType {
    /// Exchange-traded equities.
    #[default]
    Equity,
    /// Equity options.
    Option,
    /// Futures contracts.
    Future,
    /// Foreign exchange pairs.
    Forex,
    /// Cryptocurrencies.
    Crypto,
    /// Contracts for difference.
    Cfd,
    /// Market indices.
    Index,
}

impl SecurityType {
    /// Returns the security type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Option => "option",
            Self::Future => "future",
            Self::Forex => "forex",
            Self::Crypto => "crypto",
            Self::Cfd => "cfd",
            Self::Index => "index",
        }
    }
}

impl std::fmt::Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SecurityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equity" | "stock" => Ok(Self::Equity),
            "option" => Ok(Self::Option),
            "future" => Ok(Self::Future),
            "forex" | "fx" => Ok(Self::Forex),
            "crypto" => Ok(Self::Crypto),
            "cfd" => Ok(Self::Cfd),
            "index" => Ok(Self::Index),
            _ => Err(format!(
                "invalid security type '{s}', expected one of: equity, option, future, forex, crypto, cfd, index"
            )),
        }
    }
}

/// A tradable instrument: ticker symbol, market and security type.
///
/// Instruments are immutable and hashable so they can key per-instrument
/// caches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol as understood by the quote API (e.g., "IBM").
    symbol: String,
    /// Market identifier used for calendar lookups (e.g., "usa").
    market: String,
    /// Security type.
    security_type: SecurityType,
}

impl Instrument {
    /// Creates a new instrument. The market is stored lowercase.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        market: impl Into<String>,
        security_type: SecurityType,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            market: market.into().to_lowercase(),
            security_type,
        }
    }

    /// Creates a US-listed equity.
    #[must_use]
    pub fn equity(symbol: impl Into<String>) -> Self {
        Self::new(symbol, "usa", SecurityType::Equity)
    }

    /// Returns the ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the market identifier.
    #[must_use]
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Returns the security type.
    #[must_use]
    pub const fn security_type(&self) -> SecurityType {
        self.security_type
    }

    /// Returns true if this is an exchange-traded equity.
    #[must_use]
    pub const fn is_equity(&self) -> bool {
        matches!(self.security_type, SecurityType::Equity)
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.symbol, self.market, self.security_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_instrument_creation() {
        let ibm = Instrument::new("IBM", "USA", SecurityType::Equity);

        assert_eq!(ibm.symbol(), "IBM");
        assert_eq!(ibm.market(), "usa");
        assert!(ibm.is_equity());
        assert_eq!(ibm, Instrument::equity("IBM"));
    }

    #[test]
    fn test_instrument_as_key() {
        let mut keys = HashSet::new();
        keys.insert(Instrument::equity("IBM"));
        keys.insert(Instrument::equity("IBM"));
        keys.insert(Instrument::new("IBM", "usa", SecurityType::Option));

        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_security_type_parse() {
        assert_eq!("stock".parse::<SecurityType>().unwrap(), SecurityType::Equity);
        assert_eq!("FX".parse::<SecurityType>().unwrap(), SecurityType::Forex);
        assert!("bond".parse::<SecurityType>().is_err());
    }
}
