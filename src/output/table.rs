//! Shared table shaping: column ordering and cell rendering

use crate::extract::Record;
use serde_json::Value;
use std::collections::HashSet;

/// Collects every field name across the batch, ordered by first appearance
///
/// Records produced by one rule table all share a shape, so in
/// the common case this is just the first record's fields. Strategies that
/// emit heterogeneous records still get a stable, complete header.
pub(crate) fn column_union(records: &[Record]) -> Vec<String> {
    let mut columns = Vec::new();
    let mut seen = HashSet::new();

    for record in records {
        for field in record.keys() {
            if seen.insert(field.clone()) {
                columns.push(field.clone());
            }
        }
    }

    columns
}

/// Renders one cell
///
/// Strings pass through unchanged; absent fields and nulls become empty
/// cells; anything structured is rendered as compact JSON.
pub(crate) fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_column_union_preserves_first_appearance_order() {
        let records = vec![
            record_with(&[("title", json!("t1")), ("year", json!("2021"))]),
            record_with(&[("title", json!("t2")), ("authors", json!("x"))]),
            record_with(&[("doi", json!("10.1/abc"))]),
        ];

        assert_eq!(column_union(&records), ["title", "year", "authors", "doi"]);
    }

    #[test]
    fn test_column_union_of_empty_batch() {
        assert!(column_union(&[]).is_empty());
    }

    #[test]
    fn test_cell_text_string_passes_through() {
        assert_eq!(cell_text(Some(&json!("  keep  me  "))), "  keep  me  ");
    }

    #[test]
    fn test_cell_text_null_and_absent_are_empty() {
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(None), "");
    }

    #[test]
    fn test_cell_text_renders_structures_as_json() {
        assert_eq!(cell_text(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
        assert_eq!(cell_text(Some(&json!({"k": "v"}))), r#"{"k":"v"}"#);
        assert_eq!(cell_text(Some(&json!(42))), "42");
        assert_eq!(cell_text(Some(&json!(true))), "true");
    }
}
