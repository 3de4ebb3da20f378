//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The work queue behind the frontier and the text queue
//! - HTTP fetching and response classification
//! - Link extraction
//! - The fetch worker loop
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod queue;
mod worker;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, is_html_content_type, FetchResult};
pub use parser::{extract_links, extract_resolved_links};
pub use queue::{QueueFull, WorkItem, WorkQueue};
pub use worker::{process_item, run_worker, WorkerContext};
