//! HTTP fetching and resilience wrappers
//!
//! This module provides the pieces strategies compose around their network
//! calls:
//! - A shared [`reqwest::Client`] builder plus small GET/POST helpers
//! - Bounded retry ([`with_retry`], [`with_retry_if`])
//! - Fixed-delay throttling ([`RateLimiter`])
//!
//! The wrappers are independent: an operation can be throttled, retried,
//! both, or neither.

mod client;
mod retry;
mod throttle;

pub use client::{build_http_client, fetch_text, is_transient, post_json};
pub use retry::{with_retry, with_retry_if};
pub use throttle::RateLimiter;
