//! Configuration module for Text-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All crawl constants (queue capacity, depth limit, rotation ceiling, flush
//! threshold, worker multiplier, delimiters, seed URL, persistence) live here.
//!
//! # Example
//!
//! ```no_run
//! use text_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawl starts at: {}", config.crawler.seed_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, PersistenceConfig, RotationMeasure, TextConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, MAX_CONCURRENT_FETCHES, MAX_WORKER_MULTIPLIER};
