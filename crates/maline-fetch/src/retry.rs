//! Retry wrapper with exponential backoff.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::FetchError;

/// How failed requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Upper bound on a single attempt.
    pub timeout: Duration,
    /// Delay before the first retry.
    pub backoff_delay: Duration,
    /// Cap on the delay between retries.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(10),
            backoff_delay: Duration::from_millis(1500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Returns the maximum number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns the delay to wait after the given failed attempt (1-based).
    ///
    /// The delay doubles per attempt, starting at `backoff_delay` and capped
    /// at `max_backoff`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff_delay
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// A request that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// Every allowed attempt failed with a retryable error.
    #[error("{source} (gave up after {attempts} attempts)")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// The last error observed.
        source: FetchError,
    },

    /// An attempt failed with an error that retrying cannot fix.
    #[error("{source}")]
    Fatal {
        /// Attempts made, including the failing one.
        attempts: u32,
        /// The fatal error.
        source: FetchError,
    },
}

impl RetryError {
    /// Returns the number of attempts made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Fatal { attempts, .. } => *attempts,
        }
    }

    /// Returns the underlying fetch error.
    #[must_use]
    pub const fn fetch_error(&self) -> &FetchError {
        match self {
            Self::Exhausted { source, .. } | Self::Fatal { source, .. } => source,
        }
    }
}

/// Runs `operation` until it succeeds, fails fatally, or runs out of retries.
///
/// Each attempt is bounded by `policy.timeout`. Retryable failures (see
/// [`FetchError::is_retryable`]) are re-issued after an exponential delay;
/// at most `policy.max_retries + 1` attempts are made in total.
///
/// # Errors
///
/// Returns [`RetryError::Fatal`] on the first non-retryable failure and
/// [`RetryError::Exhausted`] with the last error once retries run out.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;
        let error = match tokio::time::timeout(policy.timeout, operation()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => FetchError::Timeout(policy.timeout),
        };

        if !error.is_retryable() {
            return Err(RetryError::Fatal {
                attempts,
                source: error,
            });
        }
        if attempts >= policy.max_attempts() {
            return Err(RetryError::Exhausted {
                attempts,
                source: error,
            });
        }

        let delay = policy.delay_after(attempts);
        warn!(
            attempt = attempts,
            max_attempts = policy.max_attempts(),
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "request failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
