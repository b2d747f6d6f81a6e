//! Downloader configuration.

use crate::client::ClientConfig;
use crate::rate_limit::PriceTier;
use crate::request::BASE_URL;
use std::fmt;
use vantage_types::{Result, VantageError};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "VANTAGE_API_KEY";
/// Environment variable holding the price tier.
pub const PRICE_TIER_VAR: &str = "VANTAGE_PRICE_TIER";
/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "VANTAGE_BASE_URL";

/// Settings for a [`HistoryDownloader`](crate::HistoryDownloader).
#[derive(Clone)]
pub struct DownloaderConfig {
    /// API credential.
    pub api_key: String,
    /// Subscription level sizing the rate limiter.
    pub price_tier: PriceTier,
    /// API base URL.
    pub base_url: String,
    /// HTTP client settings.
    pub client: ClientConfig,
}

impl DownloaderConfig {
    /// Creates a configuration for the free tier.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            price_tier: PriceTier::default(),
            base_url: BASE_URL.to_string(),
            client: ClientConfig::default(),
        }
    }

    /// Sets the price tier.
    #[must_use]
    pub const fn with_price_tier(mut self, price_tier: PriceTier) -> Self {
        self.price_tier = price_tier;
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the HTTP client settings.
    #[must_use]
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Reads the configuration from `VANTAGE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::MissingApiKey`] if no key is set and
    /// [`VantageError::Config`] if the price tier is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR).ok_or(VantageError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(tier) = lookup(PRICE_TIER_VAR) {
            config.price_tier = tier
                .parse()
                .map_err(|e: crate::rate_limit::PriceTierParseError| {
                    VantageError::Config(e.to_string())
                })?;
        }
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::MissingApiKey`] for a blank key and
    /// [`VantageError::Config`] for a blank base URL.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(VantageError::MissingApiKey);
        }
        if self.base_url.trim().is_empty() {
            return Err(VantageError::Config("base URL is empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("api_key", &"<redacted>")
            .field("price_tier", &self.price_tier)
            .field("base_url", &self.base_url)
            .field("client", &self.client)
            .finish()
    }
}
