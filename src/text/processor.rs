//! The text processor: the single consumer of the text queue
//!
//! For each raw HTML body it extracts readable text, drops anything too short
//! to be content, drops exact duplicates of text already accepted, and buffers
//! the rest. A full buffer is flushed to the output sink before the next body
//! is taken, which is what paces the text queue.

use crate::config::Config;
use crate::crawler::{WorkItem, WorkQueue};
use crate::output::{FlushReport, OutputSink, ProgressReport};
use crate::storage::{Storage, StorageResult, VisitedStore};
use crate::text::extract::extract_visible_text;
use crate::text::readability::summarize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Texts of this many characters or fewer are treated as noise
pub const MIN_TEXT_CHARS: usize = 20;

/// How one HTML body was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOutcome {
    /// New text, buffered for output
    Accepted,

    /// Same collapsed text was already accepted
    Duplicate,

    /// Collapsed text is `MIN_TEXT_CHARS` characters or shorter
    TooShort,

    /// Readability found no content
    Unreadable,

    /// Body was empty or whitespace
    Empty,
}

/// Where the visited set is checkpointed on every flush
#[derive(Clone)]
pub struct Checkpoint {
    pub storage: Arc<dyn Storage>,
    pub path: PathBuf,
}

/// Cleans, deduplicates and buffers page text
pub struct TextProcessor {
    readability: bool,
    buffer_size: usize,
    unique_texts: HashSet<String>,
    buffer: Vec<String>,
    sink: OutputSink,
    visited: Arc<VisitedStore>,
    frontier: Arc<WorkQueue<WorkItem>>,
    checkpoint: Option<Checkpoint>,
}

impl TextProcessor {
    /// Creates a processor writing through `sink`
    ///
    /// `visited` and `frontier` are only read, for the progress line and the
    /// checkpoint.
    pub fn new(
        config: &Config,
        sink: OutputSink,
        visited: Arc<VisitedStore>,
        frontier: Arc<WorkQueue<WorkItem>>,
        checkpoint: Option<Checkpoint>,
    ) -> Self {
        Self {
            readability: config.text.readability,
            buffer_size: config.output.buffer_size.max(1),
            unique_texts: HashSet::new(),
            buffer: Vec::new(),
            sink,
            visited,
            frontier,
            checkpoint,
        }
    }

    /// Reduces an HTML body to collapsed visible text
    pub fn clean(&self, html: &str) -> Result<String, TextOutcome> {
        if html.trim().is_empty() {
            return Err(TextOutcome::Empty);
        }

        let source = if self.readability {
            match summarize(html) {
                Ok(fragment) => Cow::Owned(fragment),
                Err(e) => {
                    tracing::debug!("Readability skipped a page: {}", e);
                    return Err(TextOutcome::Unreadable);
                }
            }
        } else {
            Cow::Borrowed(html)
        };

        Ok(extract_visible_text(&source))
    }

    /// Handles one HTML body, flushing if the buffer fills up
    ///
    /// Only a failed flush is an error.
    pub fn process(&mut self, html: &str) -> StorageResult<TextOutcome> {
        let text = match self.clean(html) {
            Ok(text) => text,
            Err(outcome) => return Ok(outcome),
        };

        if text.chars().count() <= MIN_TEXT_CHARS {
            return Ok(TextOutcome::TooShort);
        }

        if self.unique_texts.contains(&text) {
            return Ok(TextOutcome::Duplicate);
        }

        self.unique_texts.insert(text.clone());
        self.buffer.push(text);

        if self.buffer.len() >= self.buffer_size {
            self.flush()?;
        }

        Ok(TextOutcome::Accepted)
    }

    /// Writes the buffer to the sink, checkpoints, and logs progress
    pub fn flush(&mut self) -> StorageResult<FlushReport> {
        let report = self.sink.write(&self.buffer)?;
        self.buffer.clear();

        if let Some(checkpoint) = &self.checkpoint {
            self.visited
                .checkpoint(checkpoint.storage.as_ref(), &checkpoint.path)?;
        }

        let progress = ProgressReport {
            visited: self.visited.len(),
            size_mb: report.size_mb,
            queue_size: self.frontier.len(),
            unique_texts: self.unique_texts.len(),
        };
        tracing::info!("{}", progress);

        Ok(report)
    }

    /// Takes bodies from `queue` forever, marking each one done
    ///
    /// Parsing and file I/O run on the blocking pool. Returns only if a flush
    /// fails; the coordinator treats that as fatal.
    pub async fn run(
        processor: Arc<Mutex<TextProcessor>>,
        queue: Arc<WorkQueue<String>>,
    ) -> StorageResult<()> {
        loop {
            let body = queue.get().await;
            let shared = Arc::clone(&processor);
            let result =
                tokio::task::spawn_blocking(move || shared.blocking_lock().process(&body)).await;
            queue.task_done();

            match result {
                Ok(Ok(outcome)) => tracing::trace!("Text processed: {:?}", outcome),
                Ok(Err(e)) => {
                    tracing::error!("Flush failed: {}", e);
                    return Err(e);
                }
                Err(e) => tracing::error!("Text processing crashed, body skipped: {}", e),
            }
        }
    }

    /// Distinct texts accepted so far
    pub fn unique_count(&self) -> usize {
        self.unique_texts.len()
    }

    /// Texts waiting for the next flush
    pub fn buffered(&self) -> &[String] {
        &self.buffer
    }

    /// The sink this processor writes through
    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }
}
