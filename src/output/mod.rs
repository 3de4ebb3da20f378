//! Output module for writing harvested text and reporting progress
//!
//! This module handles:
//! - Appending delimited text records to size-rotated output files
//! - The progress line emitted after every flush
//! - Crawl counters and the end-of-run summary

mod sink;
pub mod stats;

pub use sink::{FilePattern, FlushReport, OutputSink};
pub use stats::{log_summary, CrawlSummary, FetchStats, ProgressReport};
