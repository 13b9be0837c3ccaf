//! Bundled crawler strategies
//!
//! Each strategy binds the pipeline to one fetching and pagination shape:
//! [`PagedHtmlCrawler`] walks a numbered sequence of HTML list pages, and
//! [`LoadMoreCrawler`] drains an offset/limit endpoint of the kind behind a
//! "load more" button. Both lean on the helpers here for pulling detail
//! links out of list markup.

mod load_more;
mod paged_html;

pub use load_more::LoadMoreCrawler;
pub use paged_html::PagedHtmlCrawler;

use crate::{ConfigError, RakeError};
use scraper::{Html, Selector};
use url::Url;

/// Attempts per HTTP request before the failure propagates
pub(crate) const FETCH_ATTEMPTS: u32 = 3;

/// Fetches a required strategy key, rejecting blank values
pub(crate) fn require_key(
    value: Option<&str>,
    key: &str,
    strategy: &str,
) -> Result<String, RakeError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ConfigError::Validation(format!(
            "the {} strategy requires the '{}' key",
            strategy, key
        ))
        .into()),
    }
}

/// Parses a selector whose syntax must be valid for the strategy to exist
///
/// Unlike `detail-selectors` rules, which degrade to null per field, a bad
/// list-side selector would silently produce an empty crawl, so it is
/// rejected at construction instead.
pub(crate) fn parse_config_selector(raw: &str, key: &str) -> Result<Selector, RakeError> {
    Selector::parse(raw).map_err(|error| {
        ConfigError::Validation(format!("invalid {} '{}': {}", key, raw, error)).into()
    })
}

/// Collects the first detail link of every list block in a document
pub(crate) fn extract_list_links(
    html: &str,
    block_selector: &Selector,
    link_selector: &Selector,
    base: Option<&Url>,
) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for block in document.select(block_selector) {
        let href = block
            .select(link_selector)
            .next()
            .and_then(|element| element.value().attr("href"));

        match href {
            Some(href) => match resolve_link(href, base) {
                Some(url) => links.push(url),
                None => tracing::debug!("Skipping unresolvable link '{}'", href),
            },
            None => tracing::debug!("List block without a link, skipped"),
        }
    }

    links
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None for empty and fragment-only hrefs, non-HTTP(S) schemes,
/// and relative hrefs when no base is available.
pub(crate) fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if let Ok(absolute) = Url::parse(href) {
        return accept_http(absolute);
    }

    base.and_then(|base| base.join(href).ok())
        .and_then(accept_http)
}

fn accept_http(url: Url) -> Option<String> {
    if url.scheme() == "http" || url.scheme() == "https" {
        Some(url.to_string())
    } else {
        None
    }
}
