//! Crawling contract, strategy registry, and run orchestration
//!
//! This module contains the site-independent core:
//! - The [`Crawler`] contract strategies implement
//! - The [`registry`] resolving `crawler-class` identifiers
//! - The [`Pipeline`] driving the four stages and persisting the result

mod contract;
mod pipeline;
pub mod registry;

pub use contract::Crawler;
pub use pipeline::{Pipeline, RunReport};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl for the given configuration
///
/// This is the main entry point. It will:
/// 1. Resolve `crawler-class` against the registry
/// 2. Fetch and parse the list pages
/// 3. Fetch and parse each detail page, containing per-item failures
/// 4. Persist the collected records to `output-path`
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(RunReport)` - Crawl finished; the report carries the counters
/// * `Err(RakeError)` - Startup or persistence failed
pub async fn crawl(config: Config) -> Result<RunReport> {
    Pipeline::new(config).run().await
}
