//! Per-request outcomes collected during a crawl

use crate::crawler::request::{CrawlRequest, Label};
use crate::snapshot::ProviderData;
use crate::FetchError;

/// Why a fetched provider page contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No table on the page
    NoTable,

    /// A table was found but it had no usable model rows
    NoModels,
}

/// Final state of one crawl request
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// Index page processed; `providers` requests were enqueued
    Discovered { providers: usize },

    /// Provider page stored with this many models
    Scraped { models: usize },

    /// Provider page fetched but skipped
    Skipped(SkipReason),

    /// Every attempt failed
    Failed { error: FetchError, attempts: u32 },
}

impl RequestOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One processed request and what came of it
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub url: String,
    pub label: Label,
    pub slug: Option<String>,
    pub outcome: RequestOutcome,
}

impl RequestRecord {
    pub fn new(request: &CrawlRequest, outcome: RequestOutcome) -> Self {
        Self {
            url: request.url.clone(),
            label: request.label,
            slug: request.slug().map(str::to_string),
            outcome,
        }
    }
}

/// Everything a finished crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Scraped providers, in no particular order
    pub providers: Vec<ProviderData>,

    /// One record per processed request, in completion order
    pub records: Vec<RequestRecord>,
}

impl CrawlReport {
    /// The discovery request's failure, if it failed
    pub fn discovery_failure(&self) -> Option<&RequestRecord> {
        self.records
            .iter()
            .find(|r| r.label == Label::Discovery && r.outcome.is_failure())
    }

    /// Number of provider requests produced by discovery
    pub fn providers_discovered(&self) -> usize {
        self.records
            .iter()
            .map(|r| match r.outcome {
                RequestOutcome::Discovered { providers } => providers,
                _ => 0,
            })
            .sum()
    }

    /// Records for requests that failed every attempt
    pub fn failures(&self) -> impl Iterator<Item = &RequestRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    /// Records for provider pages skipped by the extractor
    pub fn skipped(&self) -> impl Iterator<Item = (&RequestRecord, SkipReason)> {
        self.records.iter().filter_map(|r| match r.outcome {
            RequestOutcome::Skipped(reason) => Some((r, reason)),
            _ => None,
        })
    }
}
