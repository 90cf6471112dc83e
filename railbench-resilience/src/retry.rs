//! Fixed-interval retries

use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// One initial attempt followed by up to `retries` more
    pub fn with_retries(retries: u32, interval: Duration) -> Self {
        Self::new(retries.saturating_add(1), interval)
    }
}

/// Errors that tell whether another attempt may succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Runs an operation until it succeeds or the policy is exhausted
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            debug!("Attempt {} of {}", attempt, max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                warn!("Giving up on non-retryable error: {}", error);
                return Err(RetryError::NonRetryableError(error));
            }
            if attempt >= max_attempts {
                warn!("All {} attempts failed, last error: {}", attempt, error);
                return Err(RetryError::MaxAttemptsExceeded {
                    attempts: attempt,
                    last_error: error,
                });
            }

            warn!(
                "Attempt {} failed: {}. Next try in {:?}",
                attempt, error, self.policy.interval
            );
            sleep(self.policy.interval).await;
            attempt += 1;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last_error}")]
    MaxAttemptsExceeded { attempts: u32, last_error: E },

    #[error("not retryable: {0}")]
    NonRetryableError(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::MaxAttemptsExceeded { last_error, .. } => last_error,
            RetryError::NonRetryableError(error) => error,
        }
    }

    /// Attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::MaxAttemptsExceeded { attempts, .. } => *attempts,
            RetryError::NonRetryableError(_) => 1,
        }
    }
}
