//! The strategy contract every site binding implements

use crate::extract::Record;
use async_trait::async_trait;
use serde_json::Value;

/// A site-specific crawling strategy
///
/// One implementation binds the pipeline to one site: it knows the URLs,
/// the pagination scheme, and the page structure, while the pipeline owns
/// sequencing, failure containment, and persistence. The four operations
/// are always called in the same order: [`fetch_list`](Crawler::fetch_list)
/// once, [`parse_list`](Crawler::parse_list) once, then
/// [`fetch_detail`](Crawler::fetch_detail) and
/// [`parse_detail`](Crawler::parse_detail) per item.
///
/// Strategies bundled with the crate are registered in
/// [`registry`](crate::crawler::registry); out-of-crate implementations can
/// be run directly through
/// [`Pipeline::run_with`](crate::crawler::Pipeline::run_with).
#[async_trait]
pub trait Crawler: Send {
    /// Fetches every list page and returns the raw documents
    ///
    /// Failure here is contained by the pipeline: the run degrades to an
    /// empty page set instead of aborting.
    async fn fetch_list(&mut self) -> anyhow::Result<Vec<String>>;

    /// Extracts detail identifiers (usually URLs) from the list documents
    ///
    /// Must tolerate an empty input, returning an empty output. Whether
    /// duplicates are filtered is the strategy's own business.
    async fn parse_list(&mut self, pages: &[String]) -> anyhow::Result<Vec<String>>;

    /// Fetches the raw document behind one identifier
    async fn fetch_detail(&mut self, item: &str) -> anyhow::Result<String>;

    /// Parses one detail document into a record or a batch of records
    ///
    /// Return a JSON object for a single record, or a JSON array whose
    /// object elements each become a record. Any other shape is dropped by
    /// the pipeline with a warning.
    async fn parse_detail(&mut self, html: &str) -> anyhow::Result<Value>;

    /// The records accumulated so far, in processing order
    fn records(&self) -> &[Record];

    /// Mutable access to the accumulator; the pipeline appends through this
    fn records_mut(&mut self) -> &mut Vec<Record>;

    /// Moves the accumulated records out for persistence
    fn take_records(&mut self) -> Vec<Record> {
        std::mem::take(self.records_mut())
    }

    /// Releases any long-lived resource the strategy holds
    ///
    /// The pipeline calls this on every exit path once the strategy exists,
    /// including after a fatal persistence failure. Errors are logged and
    /// swallowed. The default does nothing, which suits strategies that
    /// only hold an HTTP client.
    async fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Crawler")
    }
}
