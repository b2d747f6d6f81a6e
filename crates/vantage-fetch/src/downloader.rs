//! Streaming history download.

use crate::client::{HttpTransport, ReqwestTransport};
use crate::config::DownloaderConfig;
use crate::executor::RequestExecutor;
use crate::normalize::BarNormalizer;
use crate::rate_limit::RateLimiter;
use crate::request::QueryRequest;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vantage_calendar::CalendarResolver;
use vantage_types::{Bar, Instrument, Resolution, Result, TickType, TimeRange, VantageError};

/// Daily requests spanning more trading days than this ask for the full history.
pub const COMPACT_TRADING_DAYS: usize = 100;

/// A lazily evaluated stream of bars.
///
/// The stream ends after the first error item.
pub type BarStream = Pin<Box<dyn Stream<Item = Result<Bar>> + Send>>;

/// A request for historical bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Instrument to download.
    pub instrument: Instrument,
    /// Bar resolution.
    pub resolution: Resolution,
    /// UTC range, inclusive at both ends.
    pub range: TimeRange,
    /// Kind of data requested.
    pub tick_type: TickType,
}

impl HistoryRequest {
    /// Creates a trade-bar request.
    #[must_use]
    pub fn new(
        instrument: Instrument,
        resolution: Resolution,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            instrument,
            resolution,
            range: TimeRange::new(start, end),
            tick_type: TickType::Trade,
        }
    }

    /// Sets the tick type.
    #[must_use]
    pub const fn with_tick_type(mut self, tick_type: TickType) -> Self {
        self.tick_type = tick_type;
        self
    }
}

/// Downloads historical bars for equities.
///
/// All streams produced by one downloader share its rate limiter and
/// calendar cache.
///
/// # Example
///
/// ```no_run
/// use chrono::{TimeZone, Utc};
/// use futures::StreamExt;
/// use vantage_fetch::{DownloaderConfig, HistoryDownloader, HistoryRequest};
/// use vantage_types::{Instrument, Resolution};
///
/// # async fn run() -> vantage_types::Result<()> {
/// let downloader = HistoryDownloader::new(&DownloaderConfig::from_env()?)?;
/// let request = HistoryRequest::new(
///     Instrument::equity("IBM"),
///     Resolution::Hour,
///     Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2021, 4, 30, 0, 0, 0).unwrap(),
/// );
///
/// let mut bars = downloader.get(&request)?;
/// while let Some(bar) = bars.next().await {
///     println!("{}", bar?.close);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HistoryDownloader {
    executor: Arc<RequestExecutor>,
    calendar: Arc<CalendarResolver>,
}

impl HistoryDownloader {
    /// Creates a downloader using reqwest and the built-in market table.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::MissingApiKey`] without a key, or an HTTP error
    /// if the client cannot be built.
    pub fn new(config: &DownloaderConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.client.clone())
            .map_err(|e| VantageError::Http(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport), CalendarResolver::global())
    }

    /// Creates a downloader from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        config: &DownloaderConfig,
        transport: Arc<dyn HttpTransport>,
        calendar: CalendarResolver,
    ) -> Result<Self> {
        config.validate()?;
        let limiter = Arc::new(RateLimiter::for_tier(config.price_tier));
        debug!(
            tier = %config.price_tier,
            permits = limiter.permits(),
            "Created history downloader"
        );
        Ok(Self {
            executor: Arc::new(RequestExecutor::new(
                transport,
                limiter,
                config.base_url.clone(),
                config.api_key.clone(),
            )),
            calendar: Arc::new(calendar),
        })
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        self.executor.limiter()
    }

    /// Returns the calendar resolver.
    #[must_use]
    pub fn calendar(&self) -> &CalendarResolver {
        &self.calendar
    }

    /// Returns a lazy stream of bars for the request.
    ///
    /// Degenerate ranges, non-trade tick types and non-equity instruments
    /// produce an empty stream without any network traffic.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::UnsupportedResolution`] for tick and second
    /// resolutions, and calendar errors for unknown markets.
    pub fn get(&self, request: &HistoryRequest) -> Result<BarStream> {
        self.get_with_cancel(request, CancellationToken::new())
    }

    /// Like [`get`](Self::get), but stops at the next slice boundary once
    /// `cancel` fires, yielding a final [`VantageError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_with_cancel(
        &self,
        request: &HistoryRequest,
        cancel: CancellationToken,
    ) -> Result<BarStream> {
        let Some((requests, normalizer)) = self.prepare(request)? else {
            return Ok(stream::empty().boxed());
        };
        Ok(slice_stream(
            Arc::clone(&self.executor),
            requests,
            normalizer,
            cancel,
        ))
    }

    /// Returns the API calls `get` would issue, without issuing them.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn plan(&self, request: &HistoryRequest) -> Result<Vec<QueryRequest>> {
        Ok(self
            .prepare(request)?
            .map(|(requests, _)| requests.collect())
            .unwrap_or_default())
    }

    /// Validates the request and builds its lazy request sequence.
    ///
    /// Returns `None` when the request yields no data by definition.
    fn prepare(&self, request: &HistoryRequest) -> Result<Option<(SliceRequests, BarNormalizer)>> {
        let HistoryRequest {
            instrument,
            resolution,
            range,
            tick_type,
        } = request;

        if range.is_degenerate() {
            debug!(%instrument, %range, "End precedes start, nothing to download");
            return Ok(None);
        }
        if *tick_type != TickType::Trade {
            debug!(%instrument, ?tick_type, "Only trade bars are available");
            return Ok(None);
        }
        let Some(period) = resolution.period().filter(|_| resolution.is_supported()) else {
            return Err(VantageError::UnsupportedResolution(*resolution));
        };
        if !instrument.is_equity() {
            debug!(%instrument, "Only equities are available");
            return Ok(None);
        }

        let tz = self.calendar.resolve(instrument)?;
        let normalizer = BarNormalizer::new(range, tz, period);

        let requests: SliceRequests = match resolution.interval() {
            Some(interval) => {
                let symbol = instrument.symbol().to_string();
                Box::new(
                    range
                        .months()
                        .map(move |month| QueryRequest::intraday(&symbol, interval, month)),
                )
            }
            None => {
                let days = self.calendar.trading_day_count(
                    instrument,
                    normalizer.start().date(),
                    normalizer.end().date(),
                )?;
                let full = days > COMPACT_TRADING_DAYS;
                debug!(%instrument, trading_days = days, full, "Planned daily request");
                Box::new(std::iter::once(QueryRequest::daily(instrument.symbol(), full)))
            }
        };

        Ok(Some((requests, normalizer)))
    }
}

type SliceRequests = Box<dyn Iterator<Item = QueryRequest> + Send>;

struct SliceState {
    executor: Arc<RequestExecutor>,
    requests: SliceRequests,
    normalizer: BarNormalizer,
    cancel: CancellationToken,
    finished: bool,
    issued: usize,
    emitted: usize,
}

/// Fetches one slice at a time, only when the consumer has drained the
/// previous one.
fn slice_stream(
    executor: Arc<RequestExecutor>,
    requests: SliceRequests,
    normalizer: BarNormalizer,
    cancel: CancellationToken,
) -> BarStream {
    let state = SliceState {
        executor,
        requests,
        normalizer,
        cancel,
        finished: false,
        issued: 0,
        emitted: 0,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        let Some(request) = state.requests.next() else {
            info!(
                requests = state.issued,
                bars = state.emitted,
                "History download complete"
            );
            return None;
        };
        if state.cancel.is_cancelled() {
            info!(requests = state.issued, "History download cancelled");
            state.finished = true;
            return Some((stream::iter(vec![Err(VantageError::Cancelled)]), state));
        }

        state.issued += 1;
        match state
            .executor
            .execute_cancellable(&request, &state.cancel)
            .await
        {
            Ok(records) => {
                let bars = state.normalizer.normalize_all(records);
                debug!(
                    slice = state.issued,
                    bars = bars.len(),
                    "Fetched history slice"
                );
                state.emitted += bars.len();
                let items: Vec<Result<Bar>> = bars.into_iter().map(Ok).collect();
                Some((stream::iter(items), state))
            }
            Err(err) => {
                state.finished = true;
                Some((stream::iter(vec![Err(err)]), state))
            }
        }
    })
    .flatten()
    .boxed()
}
