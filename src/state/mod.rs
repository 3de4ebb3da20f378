//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The coordinator's forward-only lifecycle (seeding, running, draining, stopped)
//! - `ItemOutcome`: How a single frontier item was resolved by a fetch worker

mod outcome;
mod phase;

// Re-export main types
pub use outcome::ItemOutcome;
pub use phase::CrawlPhase;
