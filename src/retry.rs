//! Bounded retries for calls to external services.
//!
//! Every attempt runs under its own timeout; failed attempts back off exponentially
//! (`base * 2^(attempt - 1)`, capped). Errors that report themselves as permanent through
//! [`Retryable`] end the loop at once. Dropping the returned future aborts the attempt in
//! flight, so request cancellation propagates without detached tasks.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::constants::{
    DEFAULT_SERVICE_MAX_ATTEMPTS, DEFAULT_SERVICE_TIMEOUT_MS, RETRY_BASE_DELAY_MS,
    RETRY_MAX_DELAY_MS,
};

/// Largest exponent applied to the base delay.
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Classifies an error as transient (worth another attempt) or permanent.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Outcome of a call that exhausted its attempts.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    /// The last attempt exceeded the per-attempt timeout.
    #[error("timed out after {attempts} attempt(s) ({timeout:?} each)")]
    TimedOut { attempts: u32, timeout: Duration },

    /// The last attempt returned an error.
    #[error("failed after {attempts} attempt(s): {source}")]
    Failed {
        attempts: u32,
        #[source]
        source: E,
    },
}

/// Timeout, attempt cap and backoff schedule for one kind of external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub timeout: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SERVICE_MAX_ATTEMPTS,
            timeout: Duration::from_millis(DEFAULT_SERVICE_TIMEOUT_MS),
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(RETRY_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            timeout,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.max(1).saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(1 << exp).min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempts are exhausted.
    pub async fn run<T, E, F, Fut>(
        &self,
        service: &'static str,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + Retryable + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let failure = match tokio::time::timeout(self.timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(source)) if !source.is_retryable() => {
                    return Err(RetryError::Failed {
                        attempts: attempt,
                        source,
                    });
                }
                Ok(Err(source)) => RetryError::Failed {
                    attempts: attempt,
                    source,
                },
                Err(_) => RetryError::TimedOut {
                    attempts: attempt,
                    timeout: self.timeout,
                },
            };

            if attempt >= max_attempts {
                return Err(failure);
            }

            let delay = self.backoff_for_attempt(attempt);
            warn!(
                service,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "External call failed; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
