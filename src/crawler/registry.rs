//! Maps `crawler-class` identifiers to strategy constructors
//!
//! The table is a closed list: adding a strategy means adding a line here,
//! and a typo in a config file fails at startup with the list of valid
//! identifiers instead of crawling nothing.

use crate::config::Config;
use crate::crawler::Crawler;
use crate::sites::{LoadMoreCrawler, PagedHtmlCrawler};
use crate::RakeError;
use std::sync::Arc;

type BuildFn = fn(Arc<Config>) -> Result<Box<dyn Crawler>, RakeError>;

/// The strategies bundled with this crate
const REGISTRY: &[(&str, BuildFn)] = &[
    ("paged-html", PagedHtmlCrawler::build),
    ("load-more", LoadMoreCrawler::build),
];

/// Resolves `crawler-class` and constructs the matching strategy
///
/// # Returns
///
/// * `Ok(Box<dyn Crawler>)` - The constructed strategy
/// * `Err(RakeError::UnknownCrawler)` - No such identifier
/// * `Err(_)` - The strategy rejected the configuration
pub fn build_crawler(config: Arc<Config>) -> Result<Box<dyn Crawler>, RakeError> {
    let name = config.crawler_class.as_str();

    for (id, build) in REGISTRY {
        if *id == name {
            return build(Arc::clone(&config));
        }
    }

    Err(RakeError::UnknownCrawler {
        name: name.to_string(),
        available: available_crawlers().join(", "),
    })
}

/// Identifiers accepted in `crawler-class`
pub fn available_crawlers() -> Vec<&'static str> {
    REGISTRY.iter().map(|(id, _)| *id).collect()
}
