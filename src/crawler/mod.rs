//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeout and retry logic
//! - The shared request frontier
//! - Routing pages to discovery or provider handling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod report;
mod request;
mod router;

pub use coordinator::{run_crawl, Coordinator, CrawlRun};
pub use fetcher::{build_http_client, fetch_page, fetch_with_retry, FetchFailure, FetchedPage, RetryPolicy};
pub use frontier::Frontier;
pub use report::{CrawlReport, RequestOutcome, RequestRecord, SkipReason};
pub use request::{CrawlRequest, Label, ProviderContext};
pub use router::{discover_providers, route, scrape_provider, ProviderOutcome, Routed};
