//! The visited store: every URL a fetch worker has claimed for fetching
//!
//! A URL enters the set at the moment a worker dequeues it and decides to
//! fetch it, never at discovery time. Check and insert happen under one lock
//! (`add`), so two workers holding the same URL cannot both fetch it.

use crate::storage::traits::{Storage, StorageResult};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrent-safe set of visited URLs
#[derive(Debug, Default)]
pub struct VisitedStore {
    urls: Mutex<HashSet<String>>,
}

impl VisitedStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `urls`
    pub fn from_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            urls: Mutex::new(urls.into_iter().collect()),
        }
    }

    /// Loads a store from a checkpoint written by `checkpoint`
    ///
    /// A missing checkpoint yields an empty store; an unreadable or malformed
    /// one is an error.
    pub fn restore(storage: &dyn Storage, path: &Path) -> StorageResult<Self> {
        match storage.load_string_set(path)? {
            Some(urls) => {
                tracing::info!(
                    "Restored {} visited URLs from {}",
                    urls.len(),
                    path.display()
                );
                Ok(Self::from_urls(urls))
            }
            None => {
                tracing::debug!("No visited checkpoint at {}, starting empty", path.display());
                Ok(Self::new())
            }
        }
    }

    /// Returns true if `url` has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.urls().contains(url)
    }

    /// Claims `url`; returns false if it was already present
    pub fn add(&self, url: &str) -> bool {
        let mut urls = self.urls();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.urls().len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.urls().is_empty()
    }

    /// Sorted copy of the set, so checkpoints are stable between writes
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls().iter().cloned().collect();
        urls.sort_unstable();
        urls
    }

    /// Overwrites the checkpoint at `path` with the full set
    pub fn checkpoint(&self, storage: &dyn Storage, path: &Path) -> StorageResult<()> {
        let urls = self.snapshot();
        storage.save_string_set(path, &urls)?;
        tracing::debug!("Checkpointed {} visited URLs to {}", urls.len(), path.display());
        Ok(())
    }

    fn urls(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set is only ever inserted into, so a poisoned guard is still consistent.
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
