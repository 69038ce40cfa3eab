//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier with the discovery request
//! - Running a bounded pool of workers against the frontier
//! - Fetching with retries, routing pages, and collecting provider results
//! - Deciding whether the run as a whole succeeded

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_with_retry, RetryPolicy};
use crate::crawler::frontier::Frontier;
use crate::crawler::report::{CrawlReport, RequestOutcome, RequestRecord, SkipReason};
use crate::crawler::request::CrawlRequest;
use crate::crawler::router::{route, ProviderOutcome, Routed};
use crate::snapshot::{build_snapshot, write_snapshot, ProviderData, RegistryData};
use crate::RegistryError;
use dashmap::DashMap;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinError;

/// State shared by every worker for the duration of one run
struct WorkerContext {
    frontier: Frontier,
    client: Client,
    policy: RetryPolicy,
    index_path: String,
    /// Provider slug -> scraped data; each key is written once
    results: Arc<DashMap<String, ProviderData>>,
    records: Mutex<Vec<RequestRecord>>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(RegistryError)` - The HTTP client could not be built
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the crawl until the frontier is drained
    ///
    /// One page's failure never stops the crawl; it is recorded in the
    /// report. The exception is the discovery page: without it there is
    /// nothing to crawl, so its failure fails the run.
    pub async fn run(&self) -> crate::Result<CrawlReport> {
        let index_url = self.config.source.index_url();
        let workers = self.config.crawler.max_concurrency.max(1) as usize;
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} with {} workers",
            index_url,
            workers
        );

        let results = Arc::new(DashMap::new());
        let context = Arc::new(WorkerContext {
            frontier: Frontier::new(),
            client: self.client.clone(),
            policy: RetryPolicy::from_config(&self.config.crawler),
            index_path: self.config.source.index_path_trimmed().to_string(),
            results: Arc::clone(&results),
            records: Mutex::new(Vec::new()),
        });

        context.frontier.push(CrawlRequest::discovery(index_url)).await;

        let handles: Vec<_> = (0..workers)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&context))))
            .collect();

        // Join every worker before reporting the first failure
        let mut worker_error = None;
        for handle in handles {
            if let Err(e) = handle.await.and_then(|joined| joined) {
                tracing::error!("Worker task failed: {}", e);
                if worker_error.is_none() {
                    worker_error = Some(e);
                }
            }
        }
        if let Some(e) = worker_error {
            return Err(RegistryError::Worker(e));
        }

        // All workers have returned; the result set is no longer written to
        let records = std::mem::take(&mut *context.records.lock().await);
        drop(context);

        let results = Arc::try_unwrap(results).unwrap_or_else(|shared| (*shared).clone());
        let report = CrawlReport {
            providers: results.into_iter().map(|(_, data)| data).collect(),
            records,
        };

        if let Some(record) = report.discovery_failure() {
            if let RequestOutcome::Failed { error, attempts } = &record.outcome {
                return Err(RegistryError::DiscoveryFailed {
                    url: record.url.clone(),
                    attempts: *attempts,
                    source: error.clone(),
                });
            }
        }

        if report.providers_discovered() == 0 {
            tracing::warn!("Discovery found no provider links on {}", self.config.source.index_url());
        }

        tracing::info!(
            "Crawl completed: {} providers scraped, {} skipped, {} failed in {:?}",
            report.providers.len(),
            report.skipped().count(),
            report.failures().count(),
            start_time.elapsed()
        );

        Ok(report)
    }
}

/// Pulls requests until the frontier reports the crawl is finished
async fn run_worker(id: usize, context: Arc<WorkerContext>) -> Result<(), JoinError> {
    while let Some(request) = context.frontier.next().await {
        tracing::debug!("Worker {} processing {} ({})", id, request.url, request.label);

        let task = process_request(Arc::clone(&context), request.clone());
        let outcome = run_tracked(&context.frontier, task).await?;
        context
            .records
            .lock()
            .await
            .push(RequestRecord::new(&request, outcome));
    }

    tracing::trace!("Worker {} finished", id);
    Ok(())
}

/// Runs one taken request to the end and marks it complete in the frontier
///
/// The request is completed even if `task` panics, so the other workers can
/// still drain the frontier and finish.
async fn run_tracked<F>(frontier: &Frontier, task: F) -> Result<F::Output, JoinError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let result = tokio::spawn(task).await;
    frontier.complete().await;
    result
}

/// Fetches and routes one request, absorbing every per-page error
async fn process_request(context: Arc<WorkerContext>, request: CrawlRequest) -> RequestOutcome {
    let page = match fetch_with_retry(&context.client, &request.url, &context.policy).await {
        Ok(page) => {
            tracing::debug!("Fetched {} (HTTP {})", page.final_url, page.status_code);
            page
        }
        Err(failure) => {
            tracing::error!(
                "Failed to fetch {} ({}) after {} attempt(s): {}",
                request.url,
                request.label,
                failure.attempts,
                failure.error
            );
            return RequestOutcome::Failed {
                error: failure.error,
                attempts: failure.attempts,
            };
        }
    };

    match route(&request, &page.body, &page.final_url, &context.index_path) {
        Routed::Enqueue(requests) => {
            tracing::info!("Found {} providers on {}", requests.len(), request.url);
            for provider in &requests {
                tracing::debug!("Enqueueing provider {:?} at {}", provider.slug(), provider.url);
            }

            // The whole fan-out becomes visible to workers at once
            let enqueued = context.frontier.push_all(requests).await;
            RequestOutcome::Discovered {
                providers: enqueued,
            }
        }

        Routed::Provider(ProviderOutcome::Scraped(data)) => {
            let models = data.models.len();
            tracing::info!(
                "Found {} models for {} ({} columns)",
                models,
                data.display_name,
                data.columns.len()
            );

            if let Some(previous) = context.results.insert(data.provider.clone(), data) {
                tracing::warn!("Provider {} was scraped twice; keeping the latest", previous.provider);
            }
            RequestOutcome::Scraped { models }
        }

        Routed::Provider(ProviderOutcome::NoTable) => {
            tracing::warn!("No capabilities table found on {}", request.url);
            RequestOutcome::Skipped(SkipReason::NoTable)
        }

        Routed::Provider(ProviderOutcome::NoModels) => {
            tracing::warn!("No models found in capabilities table on {}", request.url);
            RequestOutcome::Skipped(SkipReason::NoModels)
        }
    }
}

/// A finished run: what was crawled and the snapshot that was written
#[derive(Debug, Clone)]
pub struct CrawlRun {
    /// Per-request outcomes, in completion order
    pub records: Vec<RequestRecord>,

    /// The snapshot as written to disk
    pub snapshot: RegistryData,

    /// Where the snapshot was written
    pub snapshot_path: PathBuf,
}

/// Runs the complete pipeline
///
/// This function orchestrates the entire process:
///
/// 1. Build the HTTP client
/// 2. Fetch the provider index and enqueue one request per provider
/// 3. Fetch provider pages with bounded concurrency and extract their tables
/// 4. Sort the results into a versioned snapshot
/// 5. Atomically replace the snapshot file
///
/// # Returns
///
/// * `Ok(CrawlRun)` - The snapshot was written
/// * `Err(RegistryError)` - Discovery failed or the snapshot could not be written;
///   any previous snapshot is left in place
///
/// # Example
///
/// ```no_run
/// use capability_registry::config::Config;
/// use capability_registry::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let run = run_crawl(Config::default()).await?;
/// println!("{} providers", run.snapshot.providers.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlRun> {
    let snapshot_path = config.output.snapshot_path.clone();
    let coordinator = Coordinator::new(config)?;
    let report = coordinator.run().await?;

    let snapshot = build_snapshot(report.providers);
    write_snapshot(&snapshot_path, &snapshot)?;

    tracing::info!(
        "Wrote snapshot with {} providers ({} models) to {}",
        snapshot.providers.len(),
        snapshot.model_count(),
        snapshot_path.display()
    );

    Ok(CrawlRun {
        records: report.records,
        snapshot,
        snapshot_path,
    })
}
