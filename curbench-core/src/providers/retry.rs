//! Retry policy with exponential backoff and jitter
//!
//! The executor is a higher-order combinator: it takes any operation plus
//! the error's own retryable-vs-fatal classification (the [`Retryable`]
//! trait), so the same policy can wrap either backend adapter without
//! knowing anything about wire formats.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Classification contract for errors passed through the executor
pub trait Retryable {
    /// Whether this failure may be retried
    fn is_retryable(&self) -> bool;

    /// A provider-supplied retry-after hint, if any
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,

    /// Initial delay before first retry (milliseconds)
    pub initial_delay_ms: u64,

    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,

    /// Base for exponential backoff (e.g., 2.0 for doubling)
    pub exponential_base: f64,

    /// Jitter factor (0.0 to 1.0) to randomize delays
    pub jitter_factor: f64,

    /// Whether to honor provider retry-after hints
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
            exponential_base: 2.0,
            jitter_factor: 0.1,
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a custom retry budget
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a policy with no retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate the delay before retry `attempt` (0-based)
    ///
    /// A provider retry-after hint wins over the computed backoff when it is
    /// larger; the computed backoff is capped at `max_delay_ms` before
    /// jitter is applied.
    pub fn calculate_delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let base_delay = self.initial_delay_ms as f64 * self.exponential_base.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let delay_with_jitter = if self.jitter_factor > 0.0 {
            let mut rng = rand::thread_rng();
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rng.gen_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        let computed = Duration::from_millis(delay_with_jitter as u64);

        if self.respect_retry_after {
            if let Some(hint) = hint {
                if hint > computed {
                    return hint;
                }
            }
        }

        computed
    }

    /// Whether another retry is allowed after `retries_so_far` retries
    pub fn should_retry(&self, error: &impl Retryable, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries && error.is_retryable()
    }
}

/// Terminal failure of a retried operation
#[derive(Debug, Clone, Error)]
pub enum RetryError<E: std::error::Error> {
    /// A non-retryable failure; surfaced on the attempt that produced it
    #[error(transparent)]
    Fatal(E),

    /// The retry budget ran out; carries the last retryable failure
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

/// Successful result of a retried operation
#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    /// The operation's result
    pub value: T,

    /// How many retries were needed (0 when the first attempt succeeded)
    pub retries: u32,
}

/// Executor for retry operations
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute an operation, retrying retryable failures with backoff
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<RetryOutcome<T>, RetryError<E>>
    where
        E: Retryable + std::error::Error,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    return Ok(RetryOutcome { value, retries });
                }
                Err(error) => {
                    if !error.is_retryable() {
                        return Err(RetryError::Fatal(error));
                    }

                    if retries >= self.policy.max_retries {
                        warn!(attempts = retries + 1, error = %error, "retry budget exhausted");
                        return Err(RetryError::Exhausted {
                            attempts: retries + 1,
                            last: error,
                        });
                    }

                    let delay = self.policy.calculate_delay(retries, error.retry_after());
                    debug!(
                        retry = retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying after transient failure"
                    );

                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
            }
        }
    }
}
