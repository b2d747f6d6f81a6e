//! Quote API request construction.

use crate::client::HttpRequest;
use std::fmt;
use vantage_types::YearMonth;

/// Base URL of the quote API.
pub const BASE_URL: &str = "https://www.alphavantage.co";

/// Path of the query endpoint.
pub const QUERY_PATH: &str = "/query";

/// Function name for daily history.
pub const DAILY_FUNCTION: &str = "TIME_SERIES_DAILY";

/// Function name for intraday history.
pub const INTRADAY_FUNCTION: &str = "TIME_SERIES_INTRADAY";

/// A single quote API call, minus the credential.
///
/// # Example
///
/// ```
/// use vantage_fetch::request::QueryRequest;
/// use vantage_types::YearMonth;
///
/// let request = QueryRequest::intraday("IBM", "1min", YearMonth::new(2021, 3));
/// assert_eq!(request.param("month"), Some("2021-03"));
/// assert_eq!(request.param("adjusted"), Some("false"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    params: Vec<(&'static str, String)>,
}

impl QueryRequest {
    /// Builds a daily history request.
    ///
    /// `full` asks for the full history instead of the latest 100 points.
    #[must_use]
    pub fn daily(symbol: &str, full: bool) -> Self {
        let mut params = vec![
            ("function", DAILY_FUNCTION.to_string()),
            ("symbol", symbol.to_string()),
        ];
        if full {
            params.push(("outputsize", "full".to_string()));
        }
        params.push(("datatype", "csv".to_string()));
        Self { params }
    }

    /// Builds an unadjusted intraday request for one month.
    #[must_use]
    pub fn intraday(symbol: &str, interval: &str, month: YearMonth) -> Self {
        Self {
            params: vec![
                ("function", INTRADAY_FUNCTION.to_string()),
                ("symbol", symbol.to_string()),
                ("interval", interval.to_string()),
                ("month", month.to_string()),
                ("adjusted", "false".to_string()),
                ("outputsize", "full".to_string()),
                ("datatype", "csv".to_string()),
            ],
        }
    }

    /// Returns the value of a parameter, if present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the API function name.
    #[must_use]
    pub fn function(&self) -> &str {
        self.param("function").unwrap_or_default()
    }

    /// Returns all parameters in order.
    #[must_use]
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Converts into an HTTP request against `base_url`, appending the key.
    #[must_use]
    pub fn to_http(&self, base_url: &str, api_key: &str) -> HttpRequest {
        let mut query: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect();
        query.push(("apikey".to_string(), api_key.to_string()));

        HttpRequest {
            url: format!("{}{}", base_url.trim_end_matches('/'), QUERY_PATH),
            query,
        }
    }
}

impl fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_compact() {
        let request = QueryRequest::daily("IBM", false);
        assert_eq!(request.function(), DAILY_FUNCTION);
        assert_eq!(request.param("symbol"), Some("IBM"));
        assert_eq!(request.param("datatype"), Some("csv"));
        assert_eq!(request.param("outputsize"), None);
    }

    #[test]
    fn test_daily_full() {
        let request = QueryRequest::daily("IBM", true);
        assert_eq!(request.param("outputsize"), Some("full"));
    }

    #[test]
    fn test_intraday_params() {
        let request = QueryRequest::intraday("AAPL", "60min", YearMonth::new(2020, 12));
        assert_eq!(request.function(), INTRADAY_FUNCTION);
        assert_eq!(request.param("interval"), Some("60min"));
        assert_eq!(request.param("month"), Some("2020-12"));
        assert_eq!(request.param("outputsize"), Some("full"));
        assert_eq!(request.param("datatype"), Some("csv"));
    }

    #[test]
    fn test_to_http_appends_key() {
        let request = QueryRequest::daily("IBM", false);
        let http = request.to_http("https://example.test/", "secret");
        assert_eq!(http.url, "https://example.test/query");
        assert_eq!(http.query_param("apikey"), Some("secret"));
        assert_eq!(http.query.last().map(|(k, _)| k.as_str()), Some("apikey"));
    }

    #[test]
    fn test_display_omits_key() {
        let request = QueryRequest::daily("IBM", true);
        let shown = request.to_string();
        assert_eq!(
            shown,
            "function=TIME_SERIES_DAILY&symbol=IBM&outputsize=full&datatype=csv"
        );
        assert!(!shown.contains("apikey"));
    }
}
