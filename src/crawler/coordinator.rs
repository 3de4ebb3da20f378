//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the shared state together and drives a run through its
//! phases:
//! - Seeding: push the seed item and size the worker pool
//! - Running: spawn fetch workers and the single text processor
//! - Draining: wait until the frontier, then the text queue, has nothing in flight
//! - Stopped: cancel every task, flush what is left and checkpoint
//!
//! There is no explicit end-of-work signal. The run ends when both queues'
//! join protocols report zero unfinished items.

use crate::config::{validate, Config};
use crate::crawler::queue::{WorkItem, WorkQueue};
use crate::crawler::worker::{run_worker, WorkerContext};
use crate::crawler::build_http_client;
use crate::output::{CrawlSummary, FetchStats, OutputSink};
use crate::state::{CrawlPhase, ItemOutcome};
use crate::storage::{FsStorage, Storage, StorageResult, VisitedStore};
use crate::text::{Checkpoint, TextProcessor};
use crate::url::normalize_url;
use crate::HarvestError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{JoinError, JoinHandle};

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    phase: CrawlPhase,
    client: Client,
    visited: Arc<VisitedStore>,
    frontier: Arc<WorkQueue<WorkItem>>,
    text_queue: Arc<WorkQueue<String>>,
    limiter: Arc<Semaphore>,
    stats: Arc<FetchStats>,
    processor: Arc<Mutex<TextProcessor>>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fresh` - Ignore an existing visited checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid config, unreadable checkpoint or output directory
    pub fn new(config: Config, fresh: bool) -> Result<Self, HarvestError> {
        Self::with_storage(config, fresh, Arc::new(FsStorage::new()))
    }

    /// Creates a coordinator on top of a specific storage backend
    pub fn with_storage(
        config: Config,
        fresh: bool,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let checkpoint = config.persistence.enabled.then(|| Checkpoint {
            storage: Arc::clone(&storage),
            path: PathBuf::from(&config.persistence.visited_path),
        });

        let visited = match &checkpoint {
            Some(checkpoint) if !fresh => {
                VisitedStore::restore(checkpoint.storage.as_ref(), &checkpoint.path)?
            }
            Some(checkpoint) => {
                tracing::info!(
                    "Fresh crawl, ignoring checkpoint at {}",
                    checkpoint.path.display()
                );
                VisitedStore::new()
            }
            None => VisitedStore::new(),
        };
        let visited = Arc::new(visited);

        let frontier = Arc::new(WorkQueue::new(config.crawler.frontier_capacity));
        let text_queue = Arc::new(WorkQueue::unbounded());

        let sink = OutputSink::new(&config.output, storage)?;
        let processor = TextProcessor::new(
            &config,
            sink,
            Arc::clone(&visited),
            Arc::clone(&frontier),
            checkpoint,
        );

        let client = build_http_client(&config)?;
        let limiter = Arc::new(Semaphore::new(config.crawler.max_concurrent_fetches));

        Ok(Self {
            config: Arc::new(config),
            phase: CrawlPhase::Seeding,
            client,
            visited,
            frontier,
            text_queue,
            limiter,
            stats: Arc::new(FetchStats::new()),
            processor: Arc::new(Mutex::new(processor)),
        })
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Shared visited set
    pub fn visited(&self) -> &VisitedStore {
        &self.visited
    }

    /// Runs the crawl to completion
    ///
    /// Returns once every discovered link has been resolved and every fetched
    /// body processed, or as soon as the text processor fails to flush.
    pub async fn run(&mut self) -> Result<CrawlSummary, HarvestError> {
        if self.phase != CrawlPhase::Seeding {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::Running,
            });
        }

        let seed = normalize_url(&self.config.crawler.seed_url)?;
        self.frontier.put(WorkItem::seed(seed.as_str())).await;
        let worker_count = self.config.crawler.worker_count();
        tracing::info!(
            "Seeded {} with {} workers, {} concurrent fetches",
            seed,
            worker_count,
            self.config.crawler.max_concurrent_fetches
        );

        self.transition(CrawlPhase::Running)?;

        let ctx = WorkerContext {
            client: self.client.clone(),
            frontier: Arc::clone(&self.frontier),
            text_queue: Arc::clone(&self.text_queue),
            visited: Arc::clone(&self.visited),
            limiter: Arc::clone(&self.limiter),
            stats: Arc::clone(&self.stats),
            depth_limit: self.config.crawler.depth_limit,
        };
        let workers: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|id| tokio::spawn(run_worker(id, ctx.clone())))
            .collect();
        let mut processor_task = tokio::spawn(TextProcessor::run(
            Arc::clone(&self.processor),
            Arc::clone(&self.text_queue),
        ));

        self.transition(CrawlPhase::Draining)?;

        let frontier = Arc::clone(&self.frontier);
        let text_queue = Arc::clone(&self.text_queue);
        let drain = async move {
            frontier.join().await;
            text_queue.join().await;
        };

        let failure = tokio::select! {
            _ = drain => None,
            result = &mut processor_task => Some(processor_failure(result)),
        };

        for worker in &workers {
            worker.abort();
        }
        processor_task.abort();

        if let Some(error) = failure {
            tracing::error!("Stopping crawl: {}", error);
            return Err(error);
        }

        self.transition(CrawlPhase::Stopped)?;

        let processor = Arc::clone(&self.processor);
        let (unique_texts, records_written, final_file_index) =
            tokio::task::spawn_blocking(move || -> StorageResult<(usize, u64, u32)> {
                let mut processor = processor.blocking_lock();
                processor.flush()?;
                Ok((
                    processor.unique_count(),
                    processor.sink().records_written(),
                    processor.sink().file_index(),
                ))
            })
            .await
            .map_err(|e| HarvestError::ProcessorFailed(e.to_string()))??;

        Ok(CrawlSummary {
            visited: self.visited.len(),
            requests_sent: self.stats.requests(),
            items_skipped: self.stats.skipped(),
            pages_fetched: self.stats.count(ItemOutcome::Fetched),
            fetch_failures: self.stats.failures(),
            enqueued_links: self.stats.enqueued_links(),
            dropped_links: self.stats.dropped_links(),
            unique_texts,
            records_written,
            final_file_index,
        })
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }
}

fn processor_failure(result: Result<StorageResult<()>, JoinError>) -> HarvestError {
    match result {
        Ok(Err(e)) => HarvestError::Storage(e),
        Ok(Ok(())) => HarvestError::ProcessorFailed("text processor exited".to_string()),
        Err(e) => HarvestError::ProcessorFailed(e.to_string()),
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Restore the visited checkpoint (unless `fresh`)
/// 2. Build the HTTP client and the output sink
/// 3. Seed the frontier and start the workers and text processor
/// 4. Drain both queues
/// 5. Flush the remaining text and checkpoint
///
/// # Example
///
/// ```no_run
/// use text_harvest::config::load_config;
/// use text_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_crawl(config, false).await?;
/// println!("{} unique texts", summary.unique_texts);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlSummary, HarvestError> {
    let mut coordinator = Coordinator::new(config, fresh)?;
    coordinator.run().await
}
