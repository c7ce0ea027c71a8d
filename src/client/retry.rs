//! Bounded retry with linear backoff

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::ApiError;

/// Resubmits retriable failures (no response, or 5xx) up to `max_attempts`
/// times. Retry `n` waits `n * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Delay before the next resubmission, given how many retries already ran;
    /// `None` means the error propagates.
    pub fn backoff(&self, error: &ApiError, retries: u32) -> Option<Duration> {
        if retries >= self.max_attempts || !error.is_retriable() {
            return None;
        }
        Some(
            self.delay
                .checked_mul(retries + 1)
                .unwrap_or(Duration::MAX),
        )
    }

    /// Run `attempt` until it succeeds or the failure is final.
    ///
    /// `attempt` receives the number of retries already made (0 for the
    /// initial request). The last observed error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut retries = 0;
        loop {
            match attempt(retries).await {
                Ok(value) => return Ok(value),
                Err(err) => match self.backoff(&err, retries) {
                    Some(delay) => {
                        retries += 1;
                        warn!(
                            "Retrying request ({}/{}) in {:?}: {} ({})",
                            retries, self.max_attempts, delay, label, err
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
