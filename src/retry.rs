//! Resilient call wrapper with exponential backoff
//!
//! Both the HTTP fetcher and the translator go through [`retry_async`], so
//! the backoff policy lives in one place.
//!
//! # Backoff Strategy
//!
//! The delay before attempt `n + 1` follows:
//! ```text
//! delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..=jitter)
//! ```

use rand::{rng, Rng};
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

/// Retry configuration for a class of calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt (doubles with each attempt)
    pub base_delay: Duration,

    /// Upper bound on the exponential part of the delay
    pub max_delay: Duration,

    /// Upper bound of the random jitter added to each delay
    pub jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
        }
    }

    /// Removes the jitter (useful when delays must be predictable)
    pub fn without_jitter(mut self) -> Self {
        self.jitter = Duration::ZERO;
        self
    }

    /// The deterministic part of the delay after `attempt` failed attempts
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff_for(attempt);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            delay
        } else {
            delay + Duration::from_millis(rng().random_range(0..=jitter_ms))
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted
///
/// # Arguments
///
/// * `policy` - How many times to try and how long to wait in between
/// * `label` - Name of the call, used in log messages
/// * `is_retryable` - Decides whether an error is worth another attempt
/// * `op` - Produces a fresh future for each attempt
///
/// # Returns
///
/// The first successful result, or the last error
pub async fn retry_async<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let total_t0 = Instant::now();
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;

                if !is_retryable(&e) {
                    return Err(e);
                }

                if attempt >= policy.max_attempts {
                    error!(
                        label,
                        attempt,
                        max = policy.max_attempts,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        error = %e,
                        "Call exhausted retries"
                    );
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    label,
                    attempt,
                    max = policy.max_attempts,
                    ?delay,
                    error = %e,
                    "Call failed; backing off"
                );
                sleep(delay).await;
            }
        }
    }
}
