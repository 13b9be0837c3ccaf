//! Tabular persistence for collected records
//!
//! This module turns an ordered batch of records into a flat table on disk.
//! The destination's file extension picks the encoding:
//!
//! | Extension      | Encoding    |
//! |----------------|-------------|
//! | `.csv`, none   | CSV         |
//! | `.xls`, `.xlsx`| XLSX workbook |
//! | anything else  | error       |
//!
//! Columns are the union of all field names, ordered by first appearance
//! across the batch. Missing fields and nulls become empty cells;
//! non-string values are rendered as compact JSON.

mod delimited;
mod spreadsheet;
mod table;

use crate::extract::Record;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("No output path configured")]
    MissingPath,

    #[error("Unsupported output format '.{0}' (expected csv, xls, or xlsx)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes a batch of records to `output_path`
///
/// The parent directory is created if needed. An empty batch still prepares
/// the destination directory but writes no file; that is a warning, not an
/// error, since a crawl that found nothing is a diagnosable outcome rather
/// than a crash.
///
/// # Arguments
///
/// * `records` - The records, in the order they should appear as rows
/// * `output_path` - Destination path; its extension picks the encoding
pub fn save_records(records: &[Record], output_path: &str) -> OutputResult<()> {
    if output_path.trim().is_empty() {
        return Err(OutputError::MissingPath);
    }

    let path = Path::new(output_path);
    ensure_parent_dir(path)?;

    if records.is_empty() {
        tracing::warn!("No records collected; nothing written to {}", output_path);
        return Ok(());
    }

    let columns = table::column_union(records);
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        // No extension falls back to CSV.
        "csv" | "" => delimited::write_csv(path, &columns, records)?,
        "xls" | "xlsx" => spreadsheet::write_workbook(path, &columns, records)?,
        other => return Err(OutputError::UnsupportedFormat(other.to_string())),
    }

    tracing::info!("Saved {} record(s) to {}", records.len(), output_path);
    Ok(())
}

/// Creates the parent directory of `path` if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let records = vec![record(&[("a", "1")])];
        let result = save_records(&records, "");
        assert!(matches!(result, Err(OutputError::MissingPath)));
    }

    #[test]
    fn test_unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let records = vec![record(&[("a", "1")])];

        let result = save_records(&records, path.to_str().unwrap());
        assert!(matches!(result, Err(OutputError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_empty_batch_writes_nothing_but_prepares_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/out.csv");

        save_records(&[], path.to_str().unwrap()).unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_batch_tolerates_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");

        // With nothing to encode, the extension never comes into play.
        save_records(&[], path.to_str().unwrap()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_extensionless_path_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results");
        let records = vec![record(&[("a", "1")])];

        save_records(&records, path.to_str().unwrap()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("a"));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.CSV");
        let records = vec![record(&[("a", "1")])];

        save_records(&records, path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
