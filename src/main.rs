//! Webrake main entry point
//!
//! This is the command-line interface for the webrake crawling pipeline.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webrake::config::{load_config_with_hash, Config, SelectorRule};
use webrake::crawler::{crawl, registry};

/// Webrake: a config-driven web crawling pipeline
///
/// Webrake runs one of its registered site strategies, steered entirely by
/// a TOML configuration file: which pages to list, which fields to extract
/// from each detail page, and where the resulting table goes.
#[derive(Parser, Debug)]
#[command(name = "webrake")]
#[command(version = "0.1.0")]
#[command(about = "Run a configured site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webrake=info,warn"),
            1 => EnvFilter::new("webrake=debug,info"),
            2 => EnvFilter::new("webrake=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Webrake Dry Run ===\n");

    let registered = registry::available_crawlers();
    println!("Crawler:");
    println!("  Strategy: {}", config.crawler_class);
    println!("  Registered: {}", registered.join(", "));

    println!("\nOutput:");
    println!("  Table: {}", config.output_path);
    match &config.debug_page {
        Some(path) => println!("  Debug page: {}", path),
        None => println!("  Debug page: (disabled)"),
    }

    println!("\nFetching:");
    println!("  Rate limit: {}s between requests", config.rate_limit);
    if let Some(url) = &config.list_url {
        println!("  List URL: {}", url);
    }
    if let Some(selector) = &config.list_selector {
        println!("  List selector: {}", selector);
    }
    println!(
        "  Pages: {} starting at page {}",
        config.pagination.max_pages, config.pagination.start_page
    );
    if let Some(load_more) = &config.load_more {
        println!(
            "  Load more: from offset {} in steps of {} up to {} items",
            load_more.start_offset, load_more.step, load_more.max_items
        );
    }

    println!("\nDetail selectors ({}):", config.detail_selectors.len());
    for (field, rule) in &config.detail_selectors {
        match rule {
            SelectorRule::Text(chain) => println!("  - {}: text of '{}'", field, chain),
            SelectorRule::Attr([selector, attribute]) => {
                println!("  - {}: attribute '{}' of '{}'", field, attribute, selector)
            }
        }
    }

    if !registered.contains(&config.crawler_class.as_str()) {
        println!("\n✗ Unknown crawler-class '{}'", config.crawler_class);
        return Err(format!(
            "unknown crawler-class '{}' (available: {})",
            config.crawler_class,
            registered.join(", ")
        )
        .into());
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would run '{}' and write {}",
        config.crawler_class, config.output_path
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting crawl with strategy '{}' (rate limit: {}s)",
        config.crawler_class,
        config.rate_limit
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} list page(s), {} item(s) found, {} record(s) saved, {} skipped",
                report.list_pages,
                report.items_found,
                report.records_saved,
                report.items_skipped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
