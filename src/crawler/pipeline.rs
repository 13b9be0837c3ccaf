//! Run orchestration: list fetch, list parse, detail loop, persistence
//!
//! The pipeline draws a hard line between fatal and recoverable failures.
//! Fatal: a strategy that cannot be constructed, and a batch that cannot be
//! persisted. Recoverable: everything in between, contained at the smallest
//! useful scope. A list stage failure degrades the run to zero items; a
//! detail stage failure skips that one item and moves on.

use crate::config::Config;
use crate::crawler::registry::build_crawler;
use crate::crawler::Crawler;
use crate::output;
use crate::Result;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Counters summarizing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// List documents fetched
    pub list_pages: usize,

    /// Detail identifiers produced by list parsing
    pub items_found: usize,

    /// Records handed to the sink
    pub records_saved: usize,

    /// Items dropped by per-item failure containment
    pub items_skipped: usize,
}

/// Drives one crawl from configuration to persisted table
pub struct Pipeline {
    config: Arc<Config>,
}

impl Pipeline {
    /// Creates a pipeline for the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Resolves the configured strategy and runs it to completion
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run finished, possibly with skipped items
    /// * `Err(RakeError)` - Strategy construction or persistence failed
    pub async fn run(&self) -> Result<RunReport> {
        let crawler = build_crawler(Arc::clone(&self.config))?;
        self.run_with(crawler).await
    }

    /// Runs the pipeline over an already-built strategy
    ///
    /// This is the entry point for strategies implemented outside this
    /// crate. The strategy's `close` hook runs on every exit path from
    /// here on, success or not; a cleanup failure is logged, never
    /// propagated.
    pub async fn run_with(&self, mut crawler: Box<dyn Crawler>) -> Result<RunReport> {
        let outcome = self.execute(crawler.as_mut()).await;

        if let Err(error) = crawler.close().await {
            tracing::warn!("Crawler cleanup failed (ignored): {:#}", error);
        }

        outcome
    }

    async fn execute(&self, crawler: &mut dyn Crawler) -> Result<RunReport> {
        let mut report = RunReport::default();

        // Stage 1: list fetch. Failure degrades to an empty page set.
        let pages = match crawler.fetch_list().await {
            Ok(pages) => pages,
            Err(error) => {
                tracing::error!("List fetch failed: {:#}", error);
                Vec::new()
            }
        };
        report.list_pages = pages.len();
        tracing::info!("Fetched {} list page(s)", pages.len());

        // Stage 2: list parse. Failure degrades to zero items.
        let items = match crawler.parse_list(&pages).await {
            Ok(items) => items,
            Err(error) => {
                tracing::error!("List parse failed: {:#}", error);
                Vec::new()
            }
        };
        report.items_found = items.len();
        tracing::info!("Parsed {} item(s) from the list stage", items.len());

        if items.is_empty() && !pages.is_empty() {
            self.dump_debug_page(&pages[0]);
        }

        // Stage 3: detail loop. One item's failure never touches the rest.
        let total = items.len();
        for (index, item) in items.iter().enumerate() {
            tracing::info!("[{}/{}] Processing {}", index + 1, total, item);

            if item.trim().is_empty() {
                tracing::warn!("[{}/{}] Skipping blank identifier", index + 1, total);
                report.items_skipped += 1;
                continue;
            }

            let html = match crawler.fetch_detail(item).await {
                Ok(html) => html,
                Err(error) => {
                    tracing::warn!("Detail fetch failed for {}: {:#}", item, error);
                    report.items_skipped += 1;
                    continue;
                }
            };
            if html.is_empty() {
                tracing::warn!("Empty detail document for {}", item);
                report.items_skipped += 1;
                continue;
            }

            let parsed = match crawler.parse_detail(&html).await {
                Ok(parsed) => parsed,
                Err(error) => {
                    tracing::warn!("Detail parse failed for {}: {:#}", item, error);
                    report.items_skipped += 1;
                    continue;
                }
            };

            if !append_parsed(crawler, item, parsed) {
                report.items_skipped += 1;
            }
        }

        // Stage 4: persist. A destination the sink cannot encode must
        // surface here, not vanish into a log line.
        let records = crawler.take_records();
        report.records_saved = records.len();
        output::save_records(&records, &self.config.output_path)?;

        Ok(report)
    }

    /// Writes the first list document to the debug destination
    ///
    /// Fires when list parsing produced nothing from a non-empty page set,
    /// which nearly always means the site changed and `list-selector` no
    /// longer matches. The dump lets that be diagnosed offline.
    fn dump_debug_page(&self, page: &str) {
        let debug_path = match &self.config.debug_page {
            Some(path) => path,
            None => {
                tracing::warn!("No items parsed and no debug-page configured; skipping page dump");
                return;
            }
        };

        let path = Path::new(debug_path);
        let written = output::ensure_parent_dir(path).and_then(|_| std::fs::write(path, page));
        match written {
            Ok(_) => tracing::warn!("No items parsed; first list page dumped to {}", debug_path),
            Err(error) => tracing::error!("Failed to dump list page to {}: {}", debug_path, error),
        }
    }
}

/// Routes a `parse_detail` result into the accumulator
///
/// Returns false when the shape was unusable, so the caller can count the
/// item as skipped. An array is usable even when empty; its non-object
/// elements are dropped individually.
fn append_parsed(crawler: &mut dyn Crawler, item: &str, parsed: Value) -> bool {
    match parsed {
        Value::Object(record) => {
            crawler.records_mut().push(record);
            true
        }
        Value::Array(values) => {
            for value in values {
                match value {
                    Value::Object(record) => crawler.records_mut().push(record),
                    other => {
                        tracing::warn!(
                            "Dropping non-record {} entry from the batch for {}",
                            shape_name(&other),
                            item
                        );
                    }
                }
            }
            true
        }
        other => {
            tracing::warn!(
                "Detail parse for {} returned {}, expected an object or array; dropped",
                item,
                shape_name(&other)
            );
            false
        }
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pagination;
    use crate::extract::Record;
    use async_trait::async_trait;
    use indexmap::IndexMap;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    type DetailFn = Box<dyn Fn(&str) -> anyhow::Result<Value> + Send>;

    /// A fully scripted strategy so stage behavior can be pinned down
    /// without a network.
    struct ScriptedCrawler {
        pages: Vec<String>,
        items: Vec<String>,
        fail_fetch_list: bool,
        failing_items: Vec<String>,
        blank_detail_items: Vec<String>,
        parse: DetailFn,
        records: Vec<Record>,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedCrawler {
        fn new(items: &[&str]) -> Self {
            Self {
                pages: vec!["<html>the list page</html>".to_string()],
                items: items.iter().map(|s| s.to_string()).collect(),
                fail_fetch_list: false,
                failing_items: Vec::new(),
                blank_detail_items: Vec::new(),
                parse: Box::new(|html| {
                    let mut record = Record::new();
                    record.insert("id".to_string(), Value::String(html.to_string()));
                    Ok(Value::Object(record))
                }),
                records: Vec::new(),
                closed: Arc::new(AtomicBool::new(false)),
            }
        }

        fn closed_flag(&self) -> Arc<AtomicBool> {
            Arc::clone(&self.closed)
        }
    }

    #[async_trait]
    impl Crawler for ScriptedCrawler {
        async fn fetch_list(&mut self) -> anyhow::Result<Vec<String>> {
            if self.fail_fetch_list {
                anyhow::bail!("list endpoint down");
            }
            Ok(self.pages.clone())
        }

        async fn parse_list(&mut self, pages: &[String]) -> anyhow::Result<Vec<String>> {
            if pages.is_empty() {
                return Ok(Vec::new());
            }
            Ok(self.items.clone())
        }

        async fn fetch_detail(&mut self, item: &str) -> anyhow::Result<String> {
            if self.failing_items.iter().any(|i| i == item) {
                anyhow::bail!("detail fetch failed for {}", item);
            }
            if self.blank_detail_items.iter().any(|i| i == item) {
                return Ok(String::new());
            }
            Ok(item.to_string())
        }

        async fn parse_detail(&mut self, html: &str) -> anyhow::Result<Value> {
            (self.parse)(html)
        }

        fn records(&self) -> &[Record] {
            &self.records
        }

        fn records_mut(&mut self) -> &mut Vec<Record> {
            &mut self.records
        }

        async fn close(&mut self) -> anyhow::Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_config(output_path: &str, debug_page: Option<&str>) -> Config {
        Config {
            crawler_class: "scripted".to_string(),
            output_path: output_path.to_string(),
            debug_page: debug_page.map(str::to_string),
            rate_limit: 0.0,
            list_url: None,
            list_selector: None,
            detail_selectors: IndexMap::new(),
            documents_selector: None,
            pagination: Pagination::default(),
            load_more: None,
        }
    }

    fn csv_lines(path: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_full_run_counts_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let crawler = ScriptedCrawler::new(&["a", "b", "c"]);
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(
            report,
            RunReport {
                list_pages: 1,
                items_found: 3,
                records_saved: 3,
                items_skipped: 0,
            }
        );
        assert_eq!(csv_lines(&out), ["id", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_detail_failure_skips_only_that_item() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let mut crawler = ScriptedCrawler::new(&["a", "b", "c", "d", "e"]);
        crawler.failing_items = vec!["c".to_string()];
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.records_saved, 4);
        assert_eq!(report.items_skipped, 1);
        assert_eq!(csv_lines(&out), ["id", "a", "b", "d", "e"]);
    }

    #[tokio::test]
    async fn test_list_failure_degrades_to_an_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let mut crawler = ScriptedCrawler::new(&["a"]);
        crawler.fail_fetch_list = true;
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report, RunReport::default());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_zero_items_dump_the_first_page() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let debug = dir.path().join("debug/page1.html");
        let pipeline = Pipeline::new(test_config(
            out.to_str().unwrap(),
            Some(debug.to_str().unwrap()),
        ));

        let crawler = ScriptedCrawler::new(&[]);
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.items_found, 0);
        assert_eq!(
            std::fs::read_to_string(&debug).unwrap(),
            "<html>the list page</html>"
        );
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_zero_items_without_a_debug_destination() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let crawler = ScriptedCrawler::new(&[]);
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.items_found, 0);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_batch_shape_appends_every_object() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let mut crawler = ScriptedCrawler::new(&["a"]);
        crawler.parse = Box::new(|_| Ok(json!([{ "id": "x" }, { "id": "y" }])));
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.records_saved, 2);
        assert_eq!(report.items_skipped, 0);
    }

    #[tokio::test]
    async fn test_non_record_batch_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let mut crawler = ScriptedCrawler::new(&["a"]);
        crawler.parse = Box::new(|_| Ok(json!([{ "id": "x" }, "junk", 3, { "id": "y" }])));
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.records_saved, 2);
        assert_eq!(report.items_skipped, 0);
    }

    #[tokio::test]
    async fn test_scalar_shape_is_dropped_with_a_skip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let mut crawler = ScriptedCrawler::new(&["a"]);
        crawler.parse = Box::new(|_| Ok(Value::String("not a record".to_string())));
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.records_saved, 0);
        assert_eq!(report.items_skipped, 1);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_blank_identifier_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let crawler = ScriptedCrawler::new(&["a", "   ", "b"]);
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.records_saved, 2);
        assert_eq!(report.items_skipped, 1);
    }

    #[tokio::test]
    async fn test_empty_detail_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let mut crawler = ScriptedCrawler::new(&["a", "b"]);
        crawler.blank_detail_items = vec!["a".to_string()];
        let report = pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert_eq!(report.records_saved, 1);
        assert_eq!(report.items_skipped, 1);
    }

    #[tokio::test]
    async fn test_cleanup_runs_after_a_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let crawler = ScriptedCrawler::new(&["a"]);
        let closed = crawler.closed_flag();
        pipeline.run_with(Box::new(crawler)).await.unwrap();

        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cleanup_runs_even_when_persistence_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.parquet");
        let pipeline = Pipeline::new(test_config(out.to_str().unwrap(), None));

        let crawler = ScriptedCrawler::new(&["a"]);
        let closed = crawler.closed_flag();
        let result = pipeline.run_with(Box::new(crawler)).await;

        assert!(result.is_err());
        assert!(closed.load(Ordering::SeqCst));
    }
}
