//! Retry with exponential backoff for transient upstream failures
//!
//! A `RetryPolicy` runs an async operation up to `max_attempts` times. Only
//! errors carrying a 429 or 5xx status are retried; everything else fails on
//! first occurrence. The wait before attempt `i + 1` is
//! `min(base_delay * 2^i, max_delay)` with no jitter.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

/// Default number of attempts, including the first one
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default ceiling for any single delay
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10_000);

/// Errors that may expose an HTTP-like status code
pub trait Retryable {
    /// The status code carried by this error, if any
    fn status(&self) -> Option<u16>;
}

/// Returns true if a failure with this status should be retried.
///
/// Retryable statuses are exactly 429 and the inclusive range 500..=599.
/// Errors without a status (connection refused, timeouts) are not retried.
pub fn should_retry(status: Option<u16>) -> bool {
    matches!(status, Some(429) | Some(500..=599))
}

/// Bounds for a retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, at least 1
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryConfig {
    /// Computes the wait after a failure of the 0-indexed `attempt`.
    ///
    /// Saturates instead of overflowing, so very large attempt indices still
    /// resolve to `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Emitted before each backoff sleep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryNotice {
    /// 0-indexed attempt that just failed
    pub attempt: u32,
    /// Configured attempt budget
    pub max_attempts: u32,
    /// Status of the failure that triggered the retry
    pub status: Option<u16>,
    /// Wait before the next attempt
    pub delay: Duration,
}

/// Callback invoked with each `RetryNotice`
pub type RetrySink = Arc<dyn Fn(&RetryNotice) + Send + Sync>;

/// Executes operations with bounded exponential backoff.
///
/// The policy holds no per-call state and can be shared freely across tasks.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    sink: Option<RetrySink>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Creates a policy that logs each retry at warn level
    pub fn new(config: RetryConfig) -> Self {
        let sink: RetrySink = Arc::new(|notice: &RetryNotice| {
            warn!(
                status = ?notice.status,
                attempt = notice.attempt + 1,
                max_attempts = notice.max_attempts,
                delay_ms = notice.delay.as_millis() as u64,
                "upstream call failed, retrying"
            );
        });
        Self {
            config,
            sink: Some(sink),
        }
    }

    /// Replaces the notification sink
    pub fn with_sink(mut self, sink: RetrySink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Disables notifications entirely
    pub fn silent(mut self) -> Self {
        self.sink = None;
        self
    }

    /// The bounds this policy runs with
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent.
    ///
    /// The last failure is returned as-is. No sleep happens after the final
    /// attempt.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        E: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let status = error.status();
            let is_last = attempt + 1 >= max_attempts;
            if is_last || !should_retry(status) {
                return Err(error);
            }

            let delay = self.config.delay_for_attempt(attempt);
            if let Some(sink) = &self.sink {
                sink(&RetryNotice {
                    attempt,
                    max_attempts,
                    status,
                    delay,
                });
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
