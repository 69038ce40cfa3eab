//! Statistics for a finished crawl
//!
//! This module condenses per-request records into counts and prints them.

use crate::crawler::{Label, RequestOutcome, RequestRecord, SkipReason};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Requests processed (discovery included)
    pub total_requests: usize,

    /// Provider requests produced by discovery
    pub providers_discovered: usize,

    /// Providers stored in the snapshot
    pub providers_scraped: usize,

    /// Model rows across all scraped providers
    pub models_scraped: usize,

    /// Provider pages without any table
    pub skipped_no_table: usize,

    /// Provider pages whose table had no model rows
    pub skipped_no_models: usize,

    /// URLs that failed every attempt, with the final error
    pub failed: Vec<(String, String)>,
}

impl CrawlStatistics {
    /// Builds statistics from the crawl records
    pub fn from_records(records: &[RequestRecord]) -> Self {
        let mut stats = Self {
            total_requests: records.len(),
            ..Self::default()
        };

        for record in records {
            match &record.outcome {
                RequestOutcome::Discovered { providers } => stats.providers_discovered += providers,
                RequestOutcome::Scraped { models } => {
                    stats.providers_scraped += 1;
                    stats.models_scraped += models;
                }
                RequestOutcome::Skipped(SkipReason::NoTable) => stats.skipped_no_table += 1,
                RequestOutcome::Skipped(SkipReason::NoModels) => stats.skipped_no_models += 1,
                RequestOutcome::Failed { error, .. } => {
                    let label = match record.label {
                        Label::Discovery => format!("{} (discovery)", record.url),
                        Label::Provider => record.url.clone(),
                    };
                    stats.failed.push((label, error.to_string()));
                }
            }
        }

        stats.failed.sort();
        stats
    }

    /// Share of discovered providers that made it into the snapshot
    pub fn success_rate(&self) -> f64 {
        if self.providers_discovered == 0 {
            0.0
        } else {
            (self.providers_scraped as f64 / self.providers_discovered as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Requests processed: {}", stats.total_requests);
    println!("  Providers discovered: {}", stats.providers_discovered);
    println!("  Providers scraped: {}", stats.providers_scraped);
    println!("  Models scraped: {}", stats.models_scraped);
    println!();

    if stats.skipped_no_table + stats.skipped_no_models > 0 {
        println!("Skipped:");
        println!("  No table: {}", stats.skipped_no_table);
        println!("  No models: {}", stats.skipped_no_models);
        println!();
    }

    if !stats.failed.is_empty() {
        println!("Failed ({}):", stats.failed.len());
        for (url, error) in &stats.failed {
            println!("  - {}: {}", url, error);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} providers scraped)",
        stats.success_rate(),
        stats.providers_scraped,
        stats.providers_discovered
    );
}
