//! Bounded retry for fetch-like operations
//!
//! Failed attempts repeat immediately, without backoff; pacing between
//! requests is the throttle's job, not the retry's. Each failure is logged
//! with its attempt index, and once the budget is spent the most recent
//! failure is propagated unchanged.

use std::fmt::Display;
use std::future::Future;

/// Invokes `op` up to `attempts` times, returning the first success
///
/// `attempts` is clamped to at least 1, so the operation always runs. Every
/// failure counts against the budget.
pub async fn with_retry<T, E, F, Fut>(attempts: u32, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_if(attempts, op, |_| true).await
}

/// Like [`with_retry`], but only failures `retryable` recognizes are
/// retried; any other failure propagates immediately
pub async fn with_retry_if<T, E, F, Fut, P>(attempts: u32, mut op: F, retryable: P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !retryable(&error) {
                    return Err(error);
                }

                tracing::warn!("Attempt {}/{} failed: {}", attempt, attempts, error);
                if attempt >= attempts {
                    tracing::error!("All {} attempts failed", attempts);
                    return Err(error);
                }
            }
        }
    }
}
