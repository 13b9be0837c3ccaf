use indexmap::IndexMap;
use serde::Deserialize;

/// Main configuration structure for a crawl run
///
/// Core keys drive the pipeline itself; the rest are strategy keys that only
/// the named `crawler-class` interprets. Unknown strategies are rejected at
/// startup, unused strategy keys are simply ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Registry identifier of the strategy to run (e.g. "paged-html")
    #[serde(rename = "crawler-class")]
    pub crawler_class: String,

    /// Destination of the persisted table; the file extension picks the
    /// encoding (csv, xls, xlsx)
    #[serde(rename = "output-path")]
    pub output_path: String,

    /// Where to dump the first list page when list parsing finds no items
    #[serde(rename = "debug-page", default)]
    pub debug_page: Option<String>,

    /// Seconds to pause before each HTTP request (0 disables throttling)
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: f64,

    /// List page URL; paged strategies substitute `{page}` into it
    #[serde(rename = "list-url", default)]
    pub list_url: Option<String>,

    /// CSS selector matching one item block on a list page
    #[serde(rename = "list-selector", default)]
    pub list_selector: Option<String>,

    /// Field name -> extraction rule, applied to each detail page in the
    /// order written here
    #[serde(rename = "detail-selectors", default)]
    pub detail_selectors: IndexMap<String, SelectorRule>,

    /// CSS selector collecting attachment links on a detail page
    /// (load-more strategy)
    #[serde(rename = "documents-selector", default)]
    pub documents_selector: Option<String>,

    /// Page-range walk over the list URL (paged-html strategy)
    #[serde(default)]
    pub pagination: Pagination,

    /// Offset/limit walk over a load-more endpoint (load-more strategy)
    #[serde(rename = "load-more", default)]
    pub load_more: Option<LoadMore>,
}

/// Page-range pagination settings
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// First page number substituted for `{page}`
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// How many consecutive pages to fetch
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_start_page() -> u32 {
    1
}

fn default_max_pages() -> u32 {
    1
}

/// Offset/limit pagination settings for load-more endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct LoadMore {
    /// Offset of the first request
    #[serde(rename = "start-offset", default)]
    pub start_offset: u32,

    /// Items requested per batch; also how far the offset advances
    pub step: u32,

    /// Stop once the offset reaches this many items
    #[serde(rename = "max-items")]
    pub max_items: u32,
}

/// One field extraction rule from `detail-selectors`
///
/// Written either as a bare selector string, whose first non-empty text
/// match becomes the value, or as a `[selector, attribute]` pair extracting
/// an attribute value. The string form may chain fallbacks with `||`, tried
/// left to right.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SelectorRule {
    /// Bare selector (or `||`-chained selectors) yielding element text
    Text(String),
    /// `[selector, attribute]` pair yielding a raw attribute value
    Attr([String; 2]),
}
