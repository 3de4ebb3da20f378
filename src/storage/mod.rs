//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler writes to or reads from disk:
//! - Appending delimited text records to output files
//! - Loading and checkpointing the visited-URL set as a JSON array
//! - Listing output files and their sizes for rotation

mod fs;
mod traits;
mod visited;

pub use fs::FsStorage;
pub use traits::{FileEntry, Storage, StorageError, StorageResult};
pub use visited::VisitedStore;
