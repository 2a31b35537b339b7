//! Retry orchestration with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Retry budget and backoff for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. A value of 3 allows 4 attempts.
    pub retries: u32,
    /// Wait before the first retry. Doubles after every retry.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            interval: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }
}

/// Drive `attempt` until it succeeds, fails terminally, or the retry budget
/// runs out.
///
/// Attempts are strictly sequential. After a transient failure the loop
/// sleeps for the current interval, doubles it, and tries again; a terminal
/// failure or an exhausted budget surfaces the last error unchanged.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut remaining = policy.retries;
    let mut interval = policy.interval;

    loop {
        let error = match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if !error.is_transient() {
            return Err(error);
        }
        if remaining == 0 {
            tracing::warn!("retry budget exhausted: {}", error);
            return Err(error);
        }

        tracing::debug!(
            "transient failure, retrying in {:?} ({} left): {}",
            interval,
            remaining,
            error
        );
        tokio::time::sleep(interval).await;
        remaining -= 1;
        interval = interval.saturating_mul(2);
    }
}
