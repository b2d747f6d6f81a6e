//! Error types for vantage.

use thiserror::Error;

use crate::Resolution;

/// Result type alias for vantage operations.
pub type Result<T> = std::result::Result<T, VantageError>;

/// Errors that can occur while planning, downloading and normalizing bars.
#[derive(Error, Debug)]
pub enum VantageError {
    /// The requested resolution cannot be served by the quote API.
    #[error("Unsupported resolution: {0} (expected minute, hour or daily)")]
    UnsupportedResolution(Resolution),

    /// The response did not carry the downloadable CSV content type.
    #[error("Unexpected response format (content type {content_type:?}): {body}")]
    UnexpectedResponseFormat {
        /// Content type reported by the server, if any.
        content_type: Option<String>,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// Transport-level failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response row could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The exchange calendar has no entry for the market.
    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    /// No API key was configured.
    #[error("Missing API key")]
    MissingApiKey,

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The download was cancelled before completion.
    #[error("Download cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
