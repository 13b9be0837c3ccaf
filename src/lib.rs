//! Webrake: a config-driven web crawling pipeline
//!
//! This crate runs site-specific crawling strategies through a fixed
//! four-stage pipeline (fetch list pages, parse them into item identifiers,
//! fetch and parse each detail page) and persists the collected records as a
//! table. Which strategy runs, where the table goes, and which fields are
//! extracted all come from a TOML configuration file.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod sites;

use thiserror::Error;

/// Main error type for webrake operations
///
/// Only failures that abort a whole run surface as this type; per-item and
/// per-stage failures are contained inside the pipeline and logged instead.
#[derive(Debug, Error)]
pub enum RakeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown crawler '{name}' (available: {available})")]
    UnknownCrawler { name: String, available: String },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for webrake operations
pub type Result<T> = std::result::Result<T, RakeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SelectorRule};
pub use crawler::{Crawler, Pipeline, RunReport};
pub use extract::{extract_fields, Record};
