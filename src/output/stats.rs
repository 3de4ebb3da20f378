//! Crawl statistics and progress reporting
//!
//! This module provides the per-flush progress line, the outcome counters
//! shared by fetch workers, and the end-of-run summary.

use crate::state::ItemOutcome;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Snapshot emitted after every flush
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    /// URLs claimed for fetching so far
    pub visited: usize,

    /// Measured output size in megabytes
    pub size_mb: f64,

    /// Items currently waiting on the frontier
    pub queue_size: usize,

    /// Distinct texts accepted so far
    pub unique_texts: usize,
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Visited: {} articles, File size: {:.2} MB, Queue size: {}, Unique texts: {}",
            self.visited, self.size_mb, self.queue_size, self.unique_texts
        )
    }
}

/// Counters updated concurrently by fetch workers
#[derive(Debug, Default)]
pub struct FetchStats {
    outcomes: Mutex<HashMap<ItemOutcome, u64>>,
    dropped_links: AtomicU64,
    enqueued_links: AtomicU64,
}

impl FetchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records how one frontier item ended
    pub fn record(&self, outcome: ItemOutcome) {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        *outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Number of items that ended with `outcome`
    pub fn count(&self, outcome: ItemOutcome) -> u64 {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&outcome)
            .copied()
            .unwrap_or(0)
    }

    /// Counts a discovered link that was dropped because the frontier was full
    pub fn record_dropped_link(&self) {
        self.dropped_links.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a discovered link that was put on the frontier
    pub fn record_enqueued_link(&self) {
        self.enqueued_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_links(&self) -> u64 {
        self.dropped_links.load(Ordering::Relaxed)
    }

    pub fn enqueued_links(&self) -> u64 {
        self.enqueued_links.load(Ordering::Relaxed)
    }

    /// Items that ended in a transport or HTTP failure
    pub fn failures(&self) -> u64 {
        self.sum_where(ItemOutcome::is_failure)
    }

    /// Items for which a request was sent
    pub fn requests(&self) -> u64 {
        self.sum_where(ItemOutcome::was_requested)
    }

    /// Items rejected before any request
    pub fn skipped(&self) -> u64 {
        self.sum_where(ItemOutcome::is_skipped)
    }

    fn sum_where(&self, predicate: fn(&ItemOutcome) -> bool) -> u64 {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(outcome, _)| predicate(outcome))
            .map(|(_, count)| count)
            .sum()
    }
}

/// End-of-run summary returned by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    /// URLs in the visited set at shutdown (including restored ones)
    pub visited: usize,

    /// Requests sent, whatever their result
    pub requests_sent: u64,

    /// Items rejected before any request (depth, already visited, not HTTP)
    pub items_skipped: u64,

    /// Pages fetched successfully as HTML
    pub pages_fetched: u64,

    /// Items that failed at the transport or HTTP level
    pub fetch_failures: u64,

    /// Links discovered and put on the frontier
    pub enqueued_links: u64,

    /// Links discovered but dropped because the frontier was full
    pub dropped_links: u64,

    /// Distinct texts accepted by the processor
    pub unique_texts: usize,

    /// Records appended to output files
    pub records_written: u64,

    /// Index of the file the next write would go to
    pub final_file_index: u32,
}

/// Logs a crawl summary in a formatted manner
pub fn log_summary(summary: &CrawlSummary) {
    tracing::info!("=== Crawl Summary ===");
    tracing::info!("  Visited URLs: {}", summary.visited);
    tracing::info!("  Requests sent: {}", summary.requests_sent);
    tracing::info!("  Items skipped: {}", summary.items_skipped);
    tracing::info!("  Pages fetched: {}", summary.pages_fetched);
    tracing::info!("  Fetch failures: {}", summary.fetch_failures);
    tracing::info!("  Enqueued links: {}", summary.enqueued_links);
    tracing::info!("  Dropped links (frontier full): {}", summary.dropped_links);
    tracing::info!("  Unique texts: {}", summary.unique_texts);
    tracing::info!("  Records written: {}", summary.records_written);
    tracing::info!("  Last file index: {}", summary.final_file_index);
}
