//! Bounded retry with exponential backoff.
//!
//! [`with_retry`] is the single retry loop used by every network call in
//! this crate. Sleeping goes through the [`Sleeper`] trait so tests can
//! record backoff delays instead of waiting for them.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default delay before the first retry, in milliseconds.
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 1000;

/// Retry policy applied uniformly to every request.
///
/// `max_retries = 2` means up to three attempts in total. The delay before
/// retry `n` (1-based) is `base_backoff_ms * 2^(n-1)`: 1s, 2s, 4s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit values.
    pub fn new(max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            base_backoff_ms,
        }
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait before the given retry (1-based).
    ///
    /// Retry 0 is the initial attempt and has no delay.
    pub fn backoff_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let shift = (retry - 1).min(63);
        let multiplier = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(multiplier))
    }
}

/// Abstraction over "wait for a duration".
pub trait Sleeper: Send + Sync {
    /// Suspend for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy's
/// attempts are exhausted.
///
/// `operation` receives the zero-based attempt number. `is_retryable`
/// decides whether an error warrants another attempt; a non-retryable
/// error is returned immediately. The last error is returned once every
/// attempt has failed.
pub async fn with_retry<T, E, S, F, Fut, R>(
    policy: &RetryPolicy,
    sleeper: &S,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    S: Sleeper,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let attempts = policy.max_attempts();
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let next = attempt + 1;
                if next >= attempts || !is_retryable(&err) {
                    return Err(err);
                }
                let delay = policy.backoff_for_retry(next);
                debug!(
                    attempt = next,
                    of = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after error: {err}"
                );
                sleeper.sleep(delay).await;
                attempt = next;
            }
        }
    }
}
