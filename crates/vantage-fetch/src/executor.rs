//! Rate-limited execution of quote API calls.

use crate::client::HttpTransport;
use crate::parse::parse_records;
use crate::rate_limit::RateLimiter;
use crate::request::QueryRequest;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vantage_types::{RawRecord, Result, VantageError};

/// Issues API calls through a shared rate limiter and parses the results.
///
/// Every call consumes one permit before touching the network. Records are
/// returned sorted ascending by timestamp; rows with equal timestamps keep
/// their file order.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<RateLimiter>,
    base_url: String,
    api_key: String,
}

impl RequestExecutor {
    /// Creates an executor.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<RateLimiter>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            limiter,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Executes a request, waiting for a permit first.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, when the response is not a
    /// CSV download, or when the body cannot be parsed.
    pub async fn execute(&self, request: &QueryRequest) -> Result<Vec<RawRecord>> {
        self.execute_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Executes a request, giving up while waiting for a permit if `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`VantageError::Cancelled`].
    pub async fn execute_cancellable(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawRecord>> {
        self.limiter.acquire_cancellable(cancel).await?;

        debug!(%request, "Sending quote request");
        let response = self
            .transport
            .get(&request.to_http(&self.base_url, &self.api_key))
            .await?;

        if !response.is_download() {
            warn!(
                function = request.function(),
                content_type = ?response.content_type,
                "Quote API returned a non-CSV response"
            );
            return Err(VantageError::UnexpectedResponseFormat {
                content_type: response.content_type,
                body: response.body,
            });
        }

        let mut records = parse_records(&response.body).await?;
        records.sort_by_key(|record| record.timestamp);
        debug!(
            function = request.function(),
            records = records.len(),
            "Parsed quote response"
        );
        Ok(records)
    }
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &self.transport)
            .field("limiter", &self.limiter)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
