//! Bounded retry with exponential backoff for calls to external services.
//!
//! A [`RetryPolicy`] only re-runs an operation when the error says it is
//! worth it ([`Retryable`]). Callers decide whether the operation is safe to
//! repeat; the closure passed to [`RetryPolicy::run`] receives the 1-based
//! attempt number so it can check an idempotency key before repeating a
//! write.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Default number of attempts (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound for any single backoff delay.
pub const MAX_DELAY: Duration = Duration::from_secs(8);

/// Classifies errors as transient (worth another attempt) or permanent.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never less than 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Load the policy from environment variables.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `RETRY_MAX_ATTEMPTS`  | `3`     |
    /// | `RETRY_BASE_DELAY_MS` | `500`   |
    pub fn from_env() -> Self {
        let max_attempts = std::env::var("RETRY_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let base_delay = std::env::var("RETRY_BASE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BASE_DELAY);
        Self::new(max_attempts, base_delay)
    }

    /// Delay to wait before `attempt` (1-based). Zero for the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(MAX_DELAY)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The last error is returned when every attempt failed.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_before(attempt + 1);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "External call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(operation, attempt, error = %e, "External call failed");
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}
