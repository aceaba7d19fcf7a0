//! Retry policy for throttled and transient Graph API responses.
//!
//! Azure DevOps answers 429 when a PAT exceeds its request budget and
//! occasionally 502/503/504 under load. Both are retried with exponential
//! backoff plus jitter, honoring `Retry-After` when present.

use std::time::Duration;

use rand::Rng;
use reqwest::StatusCode;
use tracing::{info, warn};

/// Configuration for retry handling.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Base delay for exponential backoff in milliseconds (default: 1000ms).
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds (default: 60000ms).
    pub max_delay_ms: u64,
    /// Jitter as a fraction of the delay (default: 0.25).
    pub jitter_factor: f64,
    /// Maximum retry attempts per request (default: 5).
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
            jitter_factor: 0.25,
            max_retries: 5,
        }
    }
}

impl RetryConfig {
    /// Short delays for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            base_delay_ms: 10,
            max_delay_ms: 100,
            jitter_factor: 0.25,
            max_retries: 3,
        }
    }

    /// No retries at all.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::for_testing()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_delay_ms == 0 {
            return Err("base_delay_ms must be > 0".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("max_delay_ms must be >= base_delay_ms".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err("jitter_factor must be in range [0.0, 1.0]".to_string());
        }
        Ok(())
    }
}

/// Returns true for statuses worth retrying.
#[must_use]
pub fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Backoff calculator shared by every request of one client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Whether another attempt is allowed after `attempt` retries.
    #[must_use]
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.config.max_retries
    }

    /// Parses a `Retry-After` header given in seconds. HTTP dates are not supported.
    #[must_use]
    pub fn parse_retry_after(header_value: &str) -> Option<u64> {
        header_value.trim().parse::<u64>().ok()
    }

    /// base * 2^attempt, capped at the configured maximum.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.base_delay_ms as f64;
        let max = self.config.max_delay_ms as f64;
        let delay_ms = (base * 2_f64.powi(attempt.min(30) as i32)).min(max);
        Duration::from_millis(delay_ms as u64)
    }

    /// Adds up to `jitter_factor` of the delay on top.
    #[must_use]
    pub fn add_jitter(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as f64;
        let jitter_range = delay_ms * self.config.jitter_factor;
        if jitter_range <= 0.0 {
            return delay;
        }
        let jitter = rand::thread_rng().gen_range(0.0..=jitter_range);
        Duration::from_millis((delay_ms + jitter) as u64)
    }

    /// Delay before retry number `attempt`, from `Retry-After` or backoff.
    #[must_use]
    pub fn retry_delay(&self, retry_after: Option<&str>, attempt: u32) -> Duration {
        let delay = match retry_after.and_then(Self::parse_retry_after) {
            Some(secs) => {
                let cap = self.config.max_delay_ms / 1000;
                if secs > cap {
                    warn!(
                        "Retry-After {} seconds exceeds max, capping at {} seconds",
                        secs, cap
                    );
                }
                Duration::from_secs(secs.min(cap))
            }
            None => self.backoff_delay(attempt),
        };
        self.add_jitter(delay)
    }

    /// Sleeps before the next attempt.
    pub async fn wait(&self, status: StatusCode, retry_after: Option<&str>, attempt: u32) {
        let delay = self.retry_delay(retry_after, attempt);
        info!(
            "Status {}, retry {}/{} after {:?}",
            status,
            attempt + 1,
            self.config.max_retries,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}
