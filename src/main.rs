//! Capability Registry main entry point
//!
//! This is the command-line interface for the capability registry crawler.

use anyhow::Context;
use capability_registry::config::{load_config_with_hash, validate, Config};
use capability_registry::crawler::run_crawl;
use capability_registry::output::{print_snapshot_summary, print_statistics, CrawlStatistics};
use capability_registry::snapshot::load_snapshot;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Capability Registry: crawls provider documentation for model capability tables
///
/// Discovers every provider linked from the index page, extracts each
/// provider's model-capability table, and writes one JSON snapshot.
#[derive(Parser, Debug)]
#[command(name = "capability-registry")]
#[command(version)]
#[command(about = "Crawls provider docs into a model-capability snapshot", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the snapshot output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "summary")]
    dry_run: bool,

    /// Print the provider summary of the existing snapshot and exit
    #[arg(long, conflicts_with = "dry_run")]
    summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(output) = cli.output {
        config.output.snapshot_path = output;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.summary {
        handle_summary(&config)?;
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("capability_registry=info,warn"),
            1 => EnvFilter::new("capability_registry=debug,info"),
            2 => EnvFilter::new("capability_registry=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Capability Registry Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max concurrency: {}", config.crawler.max_concurrency);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);

    println!("\nSource:");
    println!("  Index URL: {}", config.source.index_url());
    println!("  Provider pages under: {}/", config.source.index_path_trimmed());

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Snapshot: {}", config.output.snapshot_path.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the --summary mode: prints the stored snapshot's provider summary
fn handle_summary(config: &Config) -> anyhow::Result<()> {
    let path = &config.output.snapshot_path;

    match load_snapshot(path).with_context(|| format!("Failed to read {}", path.display()))? {
        Some(snapshot) => print_snapshot_summary(&snapshot),
        None => println!(
            "No snapshot at {}: data not yet produced. Run a crawl first.",
            path.display()
        ),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    match run_crawl(config).await {
        Ok(run) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                println!();
                print_statistics(&CrawlStatistics::from_records(&run.records));
                println!("\n✓ Snapshot written to: {}", run.snapshot_path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("Crawl failed")
        }
    }
}
