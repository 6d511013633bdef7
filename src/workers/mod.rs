//! Background execution of scan and match work.
//!
//! The [`WorkerCoordinator`] runs work on Tokio tasks so the issuing context
//! never blocks, bounds concurrency with a semaphore, and keeps an exact
//! count of currently running units. The count is incremented before a unit
//! is spawned and decremented by a drop guard inside the task, so it is paid
//! back exactly once per unit whether the unit finishes, fails, or is
//! cancelled.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reelkeep_parser::VideoMetadata;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::matcher::{engine, MatchManager, MediaMatch};
use crate::metadata::CachedProviderClient;
use crate::scanner::{ScanConfig, ScanEngine};

/// Handle to one running unit of work.
pub struct WorkerHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Ask the unit to stop. It will not start new provider calls or visit
    /// new files after observing the request, but an in-flight call is
    /// allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the unit to finish.
    pub async fn join(self) {
        if let Err(e) = self.join.await {
            warn!("Worker task failed: {}", e);
        }
    }
}

/// Decrements the coordinator's active count exactly once when dropped.
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs scan and match units on background tasks and tracks how many are
/// currently active.
pub struct WorkerCoordinator {
    active: Arc<AtomicUsize>,
    permits: Arc<Semaphore>,
    client: Arc<CachedProviderClient>,
    matches: Arc<MatchManager>,
    review_threshold: f64,
}

impl WorkerCoordinator {
    pub fn new(
        client: Arc<CachedProviderClient>,
        matches: Arc<MatchManager>,
        max_workers: usize,
        review_threshold: f64,
    ) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            client,
            matches,
            review_threshold,
        }
    }

    /// Number of units currently running. Zero when idle.
    pub fn get_active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Schedule enrichment and matching for a metadata batch.
    ///
    /// Returns immediately. Each item gets one provider lookup; a provider
    /// failure for one item is logged and leaves that item pending without
    /// affecting the rest of the batch.
    pub fn start_match_worker(&self, items: Vec<VideoMetadata>) -> WorkerHandle {
        let cancel = CancellationToken::new();
        let guard = self.checkout();

        let client = Arc::clone(&self.client);
        let matches = Arc::clone(&self.matches);
        let permits = Arc::clone(&self.permits);
        let threshold = self.review_threshold;
        let token = cancel.clone();

        let join = tokio::spawn(async move {
            let _guard = guard;
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                // Semaphore closed means shutdown; nothing left to do.
                Err(_) => return,
            };

            info!("Match worker started for {} item(s)", items.len());
            for metadata in items {
                if token.is_cancelled() {
                    debug!("Match worker cancelled, stopping");
                    break;
                }

                match client.search(&metadata).await {
                    Ok(candidates) => {
                        let outcome = engine::evaluate(&metadata, &candidates, threshold);
                        debug!(
                            "Evaluated {:?}: {} at {:.2}",
                            metadata.path, outcome.status, outcome.confidence
                        );
                        matches.update_match(MediaMatch {
                            metadata,
                            status: outcome.status,
                            confidence: outcome.confidence,
                            user_confirmed: false,
                            candidates: Some(candidates),
                        });
                    }
                    Err(e) => {
                        warn!("Provider lookup failed for {:?}: {}", metadata.path, e);
                    }
                }
            }
        });

        WorkerHandle { cancel, join }
    }

    /// Run a full scan on a background task, ingesting every parsed file
    /// into the match manager as pending.
    pub fn start_scan_worker(&self, engine: Arc<ScanEngine>, config: ScanConfig) -> WorkerHandle {
        let cancel = CancellationToken::new();
        let guard = self.checkout();

        let matches = Arc::clone(&self.matches);
        let token = cancel.clone();

        let join = tokio::spawn(async move {
            let _guard = guard;

            let walk_token = token.clone();
            let results = tokio::task::spawn_blocking(move || {
                engine.scan_with_cancel(&config, &walk_token)
            })
            .await;

            match results {
                Ok(results) => {
                    info!("Scan worker discovered {} item(s)", results.len());
                    matches.add_metadata(results);
                }
                Err(e) => warn!("Scan task failed: {}", e),
            }
        });

        WorkerHandle { cancel, join }
    }

    fn checkout(&self) -> ActiveGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ActiveGuard(Arc::clone(&self.active))
    }
}
