//! Declarative field extraction from HTML documents
//!
//! This module turns a detail page plus a table of selector rules into a
//! record, with no knowledge of where the page came from or where the
//! record goes.
//!
//! # Rule Evaluation
//!
//! For each `(field, rule)` pair, in table order:
//!
//! - **Text rule** (`"h1.title || h1"`): candidates are tried left to
//!   right; the first candidate that matches an element with non-empty
//!   text wins. The text is the element's text nodes, each trimmed, empty
//!   ones dropped, joined with single spaces.
//! - **Attribute rule** (`["a.download", "href"]`): the first element
//!   matching the selector contributes the named attribute's value, raw.
//!
//! Evaluation always yields a value or null, never an error: a rule with
//! no match, a missing attribute, or unparseable selector syntax all
//! produce null (the last with a logged warning).

use crate::config::SelectorRule;
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

/// One extracted record: field name -> value, in extraction order
pub type Record = Map<String, Value>;

/// Applies a table of selector rules to an HTML document
///
/// The output record carries exactly the fields of `selectors`, in the
/// same order, so the same rule table always produces the same record
/// shape.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use webrake::config::SelectorRule;
/// use webrake::extract::extract_fields;
///
/// let html = r#"<html><body><h1>A Study of Things</h1></body></html>"#;
/// let mut selectors = IndexMap::new();
/// selectors.insert("title".to_string(), SelectorRule::Text("h1".to_string()));
///
/// let record = extract_fields(html, &selectors);
/// assert_eq!(record["title"], "A Study of Things");
/// ```
pub fn extract_fields(html: &str, selectors: &IndexMap<String, SelectorRule>) -> Record {
    let document = Html::parse_document(html);

    let mut record = Record::new();
    for (field, rule) in selectors {
        record.insert(field.clone(), apply_rule(&document, rule));
    }
    record
}

/// Evaluates a single rule against a parsed document
fn apply_rule(document: &Html, rule: &SelectorRule) -> Value {
    match rule {
        SelectorRule::Text(chain) => extract_text(document, chain),
        SelectorRule::Attr([selector, attribute]) => {
            extract_attribute(document, selector, attribute)
        }
    }
}

/// Tries each `||`-separated candidate until one matches with non-empty text
fn extract_text(document: &Html, chain: &str) -> Value {
    for candidate in chain.split("||") {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }

        let selector = match parse_selector(candidate) {
            Some(selector) => selector,
            None => continue,
        };

        if let Some(element) = document.select(&selector).next() {
            let text = normalized_text(element);
            if !text.is_empty() {
                return Value::String(text);
            }
        }
    }

    Value::Null
}

/// Extracts a raw attribute value from the first matching element
fn extract_attribute(document: &Html, selector: &str, attribute: &str) -> Value {
    let selector = match parse_selector(selector) {
        Some(selector) => selector,
        None => return Value::Null,
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attribute))
        .map(|value| Value::String(value.to_string()))
        .unwrap_or(Value::Null)
}

/// Parses a CSS selector, treating bad syntax as no-match
fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(error) => {
            tracing::warn!("Skipping unparseable selector '{}': {}", raw, error);
            None
        }
    }
}

/// Joins an element's text nodes with single spaces
///
/// Each text node is trimmed and whitespace-only nodes are dropped, so
/// markup indentation never leaks into extracted values.
pub fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
