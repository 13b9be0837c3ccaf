//! Configuration module for webrake
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use webrake::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler strategy: {}", config.crawler_class);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LoadMore, Pagination, SelectorRule};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
