//! Output module for reporting crawl results
//!
//! This module handles:
//! - Condensing per-request outcomes into crawl statistics
//! - Printing statistics after a run
//! - Printing the provider summary of a stored snapshot

pub mod stats;
mod summary;

pub use stats::{print_statistics, CrawlStatistics};
pub use summary::{format_snapshot_summary, print_snapshot_summary};
