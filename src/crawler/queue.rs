//! FIFO work queue with backpressure and a join protocol
//!
//! Both the frontier (`WorkItem`s) and the text queue (raw HTML bodies) are a
//! `WorkQueue`. Besides `put`/`get` it tracks an unfinished counter:
//! - incremented by every successful put
//! - decremented by `task_done`, which a consumer calls once it has fully
//!   handled an item it got
//!
//! `join` resolves only when the counter reaches zero, so an item that was
//! taken but not yet marked done still keeps the queue "in flight" even though
//! its length is zero.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{watch, Notify};

/// Returned by `try_put` when a bounded queue is at capacity; carries the rejected item
#[derive(Debug, Error)]
#[error("work queue is at capacity")]
pub struct QueueFull<T>(pub T);

/// A (url, depth) pair waiting on the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Absolute URL to fetch
    pub url: String,

    /// Link distance from the seed; the seed itself is depth 1
    pub depth: u32,
}

impl WorkItem {
    /// Create a new work item
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    /// Create the seed item (depth 1)
    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, 1)
    }

    /// Item for a link discovered on this item's page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self::new(url, self.depth + 1)
    }
}

/// Bounded or unbounded multi-producer, multi-consumer FIFO queue
pub struct WorkQueue<T> {
    /// Queued items, front is the oldest
    items: Mutex<VecDeque<T>>,

    /// Maximum number of queued items; None is unbounded
    capacity: Option<usize>,

    /// Signalled when an item is pushed
    item_ready: Notify,

    /// Signalled when an item is popped
    space_ready: Notify,

    /// Items put but not yet marked done
    unfinished: watch::Sender<usize>,
}

impl<T> WorkQueue<T> {
    /// Create a queue; `None` capacity means unbounded
    pub fn new(capacity: Option<usize>) -> Self {
        let (unfinished, _) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity,
            item_ready: Notify::new(),
            space_ready: Notify::new(),
            unfinished,
        }
    }

    /// Create a queue that holds at most `capacity` items
    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    /// Create a queue with no capacity limit
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Appends `item`, waiting for room if the queue is full
    pub async fn put(&self, item: T) {
        let mut item = item;
        loop {
            match self.try_put(item) {
                Ok(()) => {
                    if self.has_room() {
                        self.space_ready.notify_one();
                    }
                    return;
                }
                Err(QueueFull(rejected)) => {
                    item = rejected;
                    self.space_ready.notified().await;
                }
            }
        }
    }

    /// Appends `item` without waiting; hands it back if the queue is full
    pub fn try_put(&self, item: T) -> Result<(), QueueFull<T>> {
        let mut items = self.items();
        if self.capacity.is_some_and(|cap| items.len() >= cap) {
            return Err(QueueFull(item));
        }

        // Count before the item becomes visible so a fast consumer can never
        // call task_done ahead of the increment.
        self.unfinished.send_modify(|n| *n += 1);
        items.push_back(item);
        drop(items);

        self.item_ready.notify_one();
        Ok(())
    }

    /// Removes and returns the oldest item, waiting until one is available
    pub async fn get(&self) -> T {
        loop {
            if let Some(item) = self.try_get() {
                return item;
            }
            self.item_ready.notified().await;
        }
    }

    /// Removes and returns the oldest item if there is one
    pub fn try_get(&self) -> Option<T> {
        let mut items = self.items();
        let item = items.pop_front()?;
        let more = !items.is_empty();
        drop(items);

        // Pass the wakeup along: a single stored permit can cover several pushes.
        if more {
            self.item_ready.notify_one();
        }
        self.space_ready.notify_one();
        Some(item)
    }

    /// Marks one previously retrieved item as fully handled
    pub fn task_done(&self) {
        self.unfinished.send_modify(|n| {
            if *n == 0 {
                tracing::warn!("task_done called more times than items were put");
            } else {
                *n -= 1;
            }
        });
    }

    /// Waits until every item ever put has been retrieved and marked done
    pub async fn join(&self) {
        let mut unfinished = self.unfinished.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = unfinished.wait_for(|n| *n == 0).await;
    }

    /// Number of items currently queued (not counting taken-but-unfinished ones)
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Items put but not yet marked done
    pub fn unfinished(&self) -> usize {
        *self.unfinished.borrow()
    }

    /// Configured capacity, None when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns true if a bounded queue is at capacity
    pub fn is_full(&self) -> bool {
        !self.has_room()
    }

    fn has_room(&self) -> bool {
        match self.capacity {
            Some(cap) => self.items().len() < cap,
            None => true,
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<T>> {
        // No operation leaves the deque half-modified, so a poisoned guard is safe to reuse.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn test_work_item_depths() {
        let seed = WorkItem::seed("https://example.com/");
        assert_eq!(seed.depth, 1);
        let child = seed.child("https://example.com/a");
        assert_eq!(child.depth, 2);
        assert_eq!(child.url, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::unbounded();
        queue.put(1).await;
        queue.put(2).await;
        queue.put(3).await;

        assert_eq!(queue.get().await, 1);
        assert_eq!(queue.get().await, 2);
        assert_eq!(queue.get().await, 3);
    }

    #[test]
    fn test_try_put_rejects_when_full() {
        let queue = WorkQueue::bounded(2);
        assert!(queue.try_put("a").is_ok());
        assert!(queue.try_put("b").is_ok());
        assert!(queue.is_full());

        let rejected = queue.try_put("c").unwrap_err();
        assert_eq!(rejected.0, "c");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.unfinished(), 2);
    }

    #[tokio::test]
    async fn test_put_blocks_until_space() {
        let queue = Arc::new(WorkQueue::bounded(1));
        queue.put(1).await;

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.put(2).await })
        };

        tokio::time::sleep(SHORT).await;
        assert!(!producer.is_finished());

        assert_eq!(queue.get().await, 1);
        timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should unblock")
            .unwrap();
        assert_eq!(queue.get().await, 2);
    }

    #[tokio::test]
    async fn test_get_waits_for_item() {
        let queue = Arc::new(WorkQueue::unbounded());

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.get().await })
        };

        tokio::time::sleep(SHORT).await;
        assert!(!consumer.is_finished());

        queue.put("hello").await;
        let got = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake")
            .unwrap();
        assert_eq!(got, "hello");
    }

    #[tokio::test]
    async fn test_join_on_empty_queue_returns() {
        let queue: WorkQueue<u8> = WorkQueue::unbounded();
        timeout(SHORT, queue.join()).await.expect("nothing in flight");
    }

    #[tokio::test]
    async fn test_join_waits_for_task_done_not_just_get() {
        let queue = WorkQueue::unbounded();
        queue.put(1).await;

        let item = queue.get().await;
        assert_eq!(item, 1);
        assert!(queue.is_empty());
        assert_eq!(queue.unfinished(), 1);

        // Retrieved but not done: still in flight
        assert!(timeout(SHORT, queue.join()).await.is_err());

        queue.task_done();
        timeout(SHORT, queue.join()).await.expect("drained");
    }

    #[tokio::test]
    async fn test_join_sees_items_added_while_in_flight() {
        let queue = Arc::new(WorkQueue::unbounded());
        queue.put(1).await;

        let joiner = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.join().await })
        };

        let _ = queue.get().await;
        queue.put(2).await;
        queue.task_done();

        tokio::time::sleep(SHORT).await;
        assert!(!joiner.is_finished());

        let _ = queue.get().await;
        queue.task_done();
        timeout(Duration::from_secs(1), joiner)
            .await
            .expect("join should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_many_consumers_drain_everything() {
        let queue = Arc::new(WorkQueue::unbounded());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    loop {
                        let n = queue.get().await;
                        seen.lock().unwrap().push(n);
                        queue.task_done();
                    }
                })
            })
            .collect();

        for n in 0..100 {
            queue.put(n).await;
        }

        timeout(Duration::from_secs(2), queue.join())
            .await
            .expect("all items handled");

        for consumer in consumers {
            consumer.abort();
        }

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_extra_task_done_does_not_underflow() {
        let queue: WorkQueue<u8> = WorkQueue::unbounded();
        queue.task_done();
        assert_eq!(queue.unfinished(), 0);
    }
}
