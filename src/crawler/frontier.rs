//! Frontier: the shared queue of requests waiting to be fetched
//!
//! This module handles:
//! - FIFO ordering of pending requests
//! - Dropping requests for a URL that was already enqueued this run
//! - Tracking in-flight requests so workers know when the crawl is finished

use crate::crawler::request::CrawlRequest;
use std::collections::{HashSet, VecDeque};
use tokio::sync::{Mutex, Notify};

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlRequest>,
    seen: HashSet<String>,
    in_flight: usize,
}

impl FrontierState {
    fn enqueue(&mut self, request: CrawlRequest) -> bool {
        if !self.seen.insert(request.url.clone()) {
            tracing::debug!("Skipping already-enqueued URL: {}", request.url);
            return false;
        }
        self.queue.push_back(request);
        true
    }
}

/// Frontier shared by all crawl workers
///
/// The crawl is finished when the queue is empty and no request is in flight:
/// only an in-flight request can still add work.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request to the back of the queue
    ///
    /// Returns false if a request for the same URL was already enqueued.
    pub async fn push(&self, request: CrawlRequest) -> bool {
        let added = self.state.lock().await.enqueue(request);
        if added {
            self.changed.notify_waiters();
        }
        added
    }

    /// Adds a batch of requests in order, as one step
    ///
    /// Waiting workers are woken once, after the whole batch is queued.
    /// Returns how many requests were new.
    pub async fn push_all(&self, requests: impl IntoIterator<Item = CrawlRequest>) -> usize {
        let mut added = 0;
        {
            let mut state = self.state.lock().await;
            for request in requests {
                if state.enqueue(request) {
                    added += 1;
                }
            }
        }
        if added > 0 {
            self.changed.notify_waiters();
        }
        added
    }

    /// Takes the next request, waiting while other workers may still add more
    ///
    /// # Returns
    ///
    /// * `Some(CrawlRequest)` - A request to process; call [`Frontier::complete`] when done
    /// * `None` - The frontier is drained and nothing is in flight
    pub async fn next(&self) -> Option<CrawlRequest> {
        loop {
            // Registered before the check so a wakeup between the check and
            // the await is not lost
            let changed = self.changed.notified();
            {
                let mut state = self.state.lock().await;
                if let Some(request) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(request);
                }
                if state.in_flight == 0 {
                    drop(state);
                    self.changed.notify_waiters();
                    return None;
                }
            }
            changed.await;
        }
    }

    /// Marks one request returned by [`Frontier::next`] as finished
    pub async fn complete(&self) {
        {
            let mut state = self.state.lock().await;
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    /// Number of queued (not in-flight) requests
    pub async fn len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
