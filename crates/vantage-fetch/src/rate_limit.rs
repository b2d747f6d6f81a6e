//! Request spacing sized by API price tier.
//!
//! Permits are released one at a time, `window / permits` apart, so no
//! window of that length ever sees more than `permits` grants.

use governor::clock::DefaultClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use governor::{Quota, RateLimiter as GovernorLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use vantage_types::{Result, VantageError};

type DirectRateLimiter = GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Window over which price tier quotas are expressed.
pub const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Subscription level determining the request quota per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriceTier {
    /// Free key, 5 requests per minute.
    #[default]
    Free,
    /// 30 requests per minute.
    Tier30,
    /// 75 requests per minute.
    Tier75,
    /// 150 requests per minute.
    Tier150,
    /// 300 requests per minute.
    Tier300,
    /// 600 requests per minute.
    Tier600,
    /// 1200 requests per minute.
    Tier1200,
}

impl PriceTier {
    /// All tiers, cheapest first.
    pub const ALL: [Self; 7] = [
        Self::Free,
        Self::Tier30,
        Self::Tier75,
        Self::Tier150,
        Self::Tier300,
        Self::Tier600,
        Self::Tier1200,
    ];

    /// Returns the number of requests allowed per minute.
    #[must_use]
    pub const fn requests_per_minute(&self) -> u32 {
        match self {
            Self::Free => 5,
            Self::Tier30 => 30,
            Self::Tier75 => 75,
            Self::Tier150 => 150,
            Self::Tier300 => 300,
            Self::Tier600 => 600,
            Self::Tier1200 => 1200,
        }
    }

    /// Returns the canonical name of the tier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Tier30 => "30",
            Self::Tier75 => "75",
            Self::Tier150 => "150",
            Self::Tier300 => "300",
            Self::Tier600 => "600",
            Self::Tier1200 => "1200",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a price tier string cannot be parsed.
#[derive(Debug, Clone, Error)]
#[error("Invalid price tier: {0}. Use 'free' or one of 30, 75, 150, 300, 600, 1200")]
pub struct PriceTierParseError(String);

impl FromStr for PriceTier {
    type Err = PriceTierParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let digits = normalized.strip_prefix("tier").unwrap_or(&normalized);
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == digits)
            .ok_or_else(|| PriceTierParseError(s.to_string()))
    }
}

/// Rate limiter shared by every request a downloader issues.
///
/// Allows at most `permits` acquisitions in any span of `window`, spaced
/// evenly with no burst allowance.
pub struct RateLimiter {
    limiter: DirectRateLimiter,
    permits: u32,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `permits` requests per `window`.
    ///
    /// A zero `permits` is treated as one.
    #[must_use]
    pub fn new(permits: u32, window: Duration) -> Self {
        let permits = permits.max(1);
        Self {
            limiter: GovernorLimiter::direct(quota_from_window(window, permits)),
            permits,
            window,
        }
    }

    /// Creates a limiter for the given price tier.
    #[must_use]
    pub fn for_tier(tier: PriceTier) -> Self {
        Self::new(tier.requests_per_minute(), QUOTA_WINDOW)
    }

    /// Returns the number of permits per window.
    #[must_use]
    pub const fn permits(&self) -> u32 {
        self.permits
    }

    /// Returns the quota window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Waits until a permit is available and consumes it.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Waits for a permit unless `cancel` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::Cancelled`] if the token is cancelled before
    /// a permit becomes available. No permit is consumed in that case.
    pub async fn acquire_cancellable(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(VantageError::Cancelled),
            () = self.limiter.until_ready() => Ok(()),
        }
    }

    /// Consumes a permit if one is immediately available.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("permits", &self.permits)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

fn quota_from_window(window: Duration, permits: u32) -> Quota {
    let permits = NonZeroU32::new(permits).unwrap_or(NonZeroU32::MIN);
    let seconds_per_cell = (window.as_secs_f64() / f64::from(permits.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    // A burst of one keeps grants a full period apart.
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(permits))
        .allow_burst(NonZeroU32::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_tier_quotas() {
        assert_eq!(PriceTier::Free.requests_per_minute(), 5);
        assert_eq!(PriceTier::Tier75.requests_per_minute(), 75);
        assert_eq!(PriceTier::Tier1200.requests_per_minute(), 1200);
        assert_eq!(PriceTier::default(), PriceTier::Free);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("free".parse::<PriceTier>().unwrap(), PriceTier::Free);
        assert_eq!("FREE".parse::<PriceTier>().unwrap(), PriceTier::Free);
        assert_eq!("150".parse::<PriceTier>().unwrap(), PriceTier::Tier150);
        assert_eq!("tier600".parse::<PriceTier>().unwrap(), PriceTier::Tier600);
        assert!("100".parse::<PriceTier>().is_err());
        assert!("gold".parse::<PriceTier>().is_err());
    }

    #[test]
    fn test_tier_display_round_trips() {
        for tier in PriceTier::ALL {
            assert_eq!(tier.to_string().parse::<PriceTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_no_burst_beyond_one() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_window_never_exceeds_permits() {
        let window = Duration::from_millis(500);
        let limiter = RateLimiter::new(5, window);
        let started = Instant::now();
        let mut granted = 0;
        while started.elapsed() < window - Duration::from_millis(10) {
            if limiter.try_acquire() {
                granted += 1;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(granted <= 5, "granted {granted} permits in one window");
        assert!(granted >= 2);
    }

    #[test]
    fn test_zero_permits_treated_as_one() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert_eq!(limiter.permits(), 1);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_for_tier() {
        let limiter = RateLimiter::for_tier(PriceTier::Free);
        assert_eq!(limiter.permits(), 5);
        assert_eq!(limiter.window(), QUOTA_WINDOW);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_acquire_spreads_grants_over_window() {
        let window = Duration::from_millis(500);
        let limiter = RateLimiter::new(5, window);
        let started = Instant::now();
        for _ in 0..6 {
            limiter.acquire().await;
        }
        // The sixth grant cannot share a window with the first.
        assert!(started.elapsed() >= window - Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_acquire_cancelled_before_wait() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_acquire());

        let token = CancellationToken::new();
        token.cancel();
        let result = limiter.acquire_cancellable(&token).await;
        assert!(matches!(result, Err(VantageError::Cancelled)));
    }

    #[tokio::test]
    async fn test_acquire_cancelled_while_waiting() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.acquire().await;

        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            child.cancel();
        });

        let result = limiter.acquire_cancellable(&token).await;
        assert!(matches!(result, Err(VantageError::Cancelled)));
    }

    #[tokio::test]
    async fn test_acquire_cancellable_with_permits() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let token = CancellationToken::new();
        assert!(limiter.acquire_cancellable(&token).await.is_ok());
    }
}
