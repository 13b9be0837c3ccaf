//! Fixed-delay request throttling

use std::future::Future;
use std::time::Duration;

/// Pauses for a fixed delay immediately before each wrapped operation
///
/// The pause happens before the first operation too, not only between
/// operations, so a strategy never bursts its first request. A zero delay
/// turns the limiter into a no-op.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
}

impl RateLimiter {
    /// Creates a limiter pausing `seconds` before each operation
    ///
    /// Non-positive values disable the pause.
    pub fn new(seconds: f64) -> Self {
        let delay = if seconds > 0.0 {
            Duration::from_secs_f64(seconds)
        } else {
            Duration::ZERO
        };
        Self { delay }
    }

    /// The configured pause
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the configured pause
    pub async fn acquire(&self) {
        if !self.delay.is_zero() {
            tracing::debug!("Rate limit: pausing {:?}", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Runs `op` after the configured pause
    pub async fn run<T, Fut>(&self, op: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        self.acquire().await;
        op.await
    }
}
