//! Load-more (offset/limit) endpoint strategy

use crate::config::{Config, LoadMore};
use crate::crawler::Crawler;
use crate::extract::{extract_fields, Record};
use crate::fetch::{
    build_http_client, fetch_text, is_transient, post_json, with_retry_if, RateLimiter,
};
use crate::sites::{extract_list_links, parse_config_selector, require_key, FETCH_ATTEMPTS};
use crate::{ConfigError, RakeError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// Crawls sites whose list grows behind a "load more" button
///
/// The endpoint at `list-url` is POSTed `{"offset": N, "limit": step}` and
/// answers with a JSON object carrying an `entries` array of rendered HTML
/// fragments. The walk advances by `step` until `max-items` is reached or
/// the server runs dry. Each fragment's `list-selector` block contributes
/// its first link as a detail identifier.
///
/// On detail pages, `documents-selector` (when configured) collects every
/// matching link into a multi-valued `documents` field alongside the
/// declarative ones.
#[derive(Debug)]
pub struct LoadMoreCrawler {
    config: Arc<Config>,
    client: Client,
    limiter: RateLimiter,
    list_url: String,
    load_more: LoadMore,
    list_selector: Selector,
    link_selector: Selector,
    documents_selector: Option<Selector>,
    /// Parsed endpoint URL, the base for resolving entry links
    endpoint: Option<Url>,
    records: Vec<Record>,
}

impl LoadMoreCrawler {
    /// Registry constructor
    pub fn build(config: Arc<Config>) -> Result<Box<dyn Crawler>, RakeError> {
        Ok(Box::new(Self::new(config)?))
    }

    /// Validates the strategy's keys and prepares its HTTP client
    pub fn new(config: Arc<Config>) -> Result<Self, RakeError> {
        let list_url = require_key(config.list_url.as_deref(), "list-url", "load-more")?;
        let raw_selector =
            require_key(config.list_selector.as_deref(), "list-selector", "load-more")?;

        let load_more = match &config.load_more {
            Some(load_more) => load_more.clone(),
            None => {
                return Err(ConfigError::Validation(
                    "the load-more strategy requires the [load-more] table".to_string(),
                )
                .into())
            }
        };

        let list_selector = parse_config_selector(&raw_selector, "list-selector")?;
        let link_selector = parse_config_selector("a[href]", "list link selector")?;
        let documents_selector = match config.documents_selector.as_deref() {
            Some(raw) => Some(parse_config_selector(raw, "documents-selector")?),
            None => None,
        };

        let endpoint = Url::parse(&list_url).ok();
        let client = build_http_client()?;
        let limiter = RateLimiter::new(config.rate_limit);

        Ok(Self {
            config,
            client,
            limiter,
            list_url,
            load_more,
            list_selector,
            link_selector,
            documents_selector,
            endpoint,
            records: Vec::new(),
        })
    }
}

#[async_trait]
impl Crawler for LoadMoreCrawler {
    async fn fetch_list(&mut self) -> anyhow::Result<Vec<String>> {
        let mut entries = Vec::new();
        let mut offset = self.load_more.start_offset;

        while offset < self.load_more.max_items {
            tracing::info!(
                "Fetching batch at offset {} (limit {})",
                offset,
                self.load_more.step
            );
            let payload = json!({ "offset": offset, "limit": self.load_more.step });

            let response = with_retry_if(
                FETCH_ATTEMPTS,
                || self.limiter.run(post_json(&self.client, &self.list_url, &payload)),
                is_transient,
            )
            .await?;

            let batch = match response.get("entries").and_then(Value::as_array) {
                Some(batch) => batch,
                None => {
                    tracing::warn!("Batch at offset {} has no entries array; stopping", offset);
                    break;
                }
            };
            if batch.is_empty() {
                tracing::info!("Server ran dry at offset {}", offset);
                break;
            }

            for entry in batch {
                match entry.as_str() {
                    Some(html) => entries.push(html.to_string()),
                    None => tracing::warn!("Ignoring non-text entry at offset {}", offset),
                }
            }

            offset = offset.saturating_add(self.load_more.step);
        }

        Ok(entries)
    }

    async fn parse_list(&mut self, pages: &[String]) -> anyhow::Result<Vec<String>> {
        let mut items = Vec::new();

        for entry in pages {
            items.extend(extract_list_links(
                entry,
                &self.list_selector,
                &self.link_selector,
                self.endpoint.as_ref(),
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
        let mut record = extract_fields(html, &self.config.detail_selectors);

        // Attachment links are multi-valued, so they ride alongside the
        // declarative fields instead of through them.
        if let Some(selector) = &self.documents_selector {
            let document = Html::parse_document(html);
            let links: Vec<Value> = document
                .select(selector)
                .filter_map(|element| element.value().attr("href"))
                .map(|href| Value::String(href.to_string()))
                .collect();
            record.insert("documents".to_string(), Value::Array(links));
        }

        Ok(Value::Object(record))
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }
}
