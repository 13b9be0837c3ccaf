//! Paginated HTML list strategy

use crate::config::Config;
use crate::crawler::Crawler;
use crate::extract::{extract_fields, Record};
use crate::fetch::{build_http_client, fetch_text, is_transient, with_retry_if, RateLimiter};
use crate::sites::{extract_list_links, parse_config_selector, require_key, FETCH_ATTEMPTS};
use crate::RakeError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::Selector;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Crawls sites whose list is a numbered sequence of HTML pages
///
/// `list-url` carries a `{page}` placeholder (for example
/// `https://journal.example.org/articles?page={page}`), substituted for
/// each page in the configured `[pagination]` range. Every `list-selector`
/// block contributes its first link as a detail identifier, and detail
/// pages go through the declarative field extractor.
#[derive(Debug)]
pub struct PagedHtmlCrawler {
    config: Arc<Config>,
    client: Client,
    limiter: RateLimiter,
    list_url: String,
    list_selector: Selector,
    link_selector: Selector,
    /// URL of each fetched page, for resolving relative detail links
    page_urls: Vec<String>,
    records: Vec<Record>,
}

impl PagedHtmlCrawler {
    /// Registry constructor
    pub fn build(config: Arc<Config>) -> Result<Box<dyn Crawler>, RakeError> {
        Ok(Box::new(Self::new(config)?))
    }

    /// Validates the strategy's keys and prepares its HTTP client
    pub fn new(config: Arc<Config>) -> Result<Self, RakeError> {
        let list_url = require_key(config.list_url.as_deref(), "list-url", "paged-html")?;
        let raw_selector =
            require_key(config.list_selector.as_deref(), "list-selector", "paged-html")?;
        let list_selector = parse_config_selector(&raw_selector, "list-selector")?;
        let link_selector = parse_config_selector("a[href]", "list link selector")?;

        let client = build_http_client()?;
        let limiter = RateLimiter::new(config.rate_limit);

        Ok(Self {
            config,
            client,
            limiter,
            list_url,
            list_selector,
            link_selector,
            page_urls: Vec::new(),
            records: Vec::new(),
        })
    }

    fn page_url(&self, page: u32) -> String {
        self.list_url.replace("{page}", &page.to_string())
    }
}

#[async_trait]
impl Crawler for PagedHtmlCrawler {
    async fn fetch_list(&mut self) -> anyhow::Result<Vec<String>> {
        let start = self.config.pagination.start_page;
        let end = start.saturating_add(self.config.pagination.max_pages);

        let mut pages = Vec::new();
        for page in start..end {
            let url = self.page_url(page);
            tracing::info!("Fetching list page {} ({})", page, url);

            let html = with_retry_if(
                FETCH_ATTEMPTS,
                || self.limiter.run(fetch_text(&self.client, &url)),
                is_transient,
            )
            .await?;

            pages.push(html);
            self.page_urls.push(url);
        }

        Ok(pages)
    }

    async fn parse_list(&mut self, pages: &[String]) -> anyhow::Result<Vec<String>> {
        let mut items = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            let base = self
                .page_urls
                .get(index)
                .and_then(|url| Url::parse(url).ok());

            items.extend(extract_list_links(
                page,
                &self.list_selector,
                &self.link_selector,
                base.as_ref(),
            ));
        }

        Ok(items)
    }

    async fn fetch_detail(&mut self, item: &str) -> anyhow::Result<String> {
        with_retry_if(
            FETCH_ATTEMPTS,
            || self.limiter.run(fetch_text(&self.client, item)),
            is_transient,
        )
        .await
    }

    async fn parse_detail(&mut self, html: &str) -> anyhow::Result<Value> {
        Ok(Value::Object(extract_fields(
            html,
            &self.config.detail_selectors,
        )))
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }
}
