use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, PersistenceConfig, UserAgentConfig,
};
use crate::output::FilePattern;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on fetch workers spawned per CPU
pub const MAX_WORKER_MULTIPLIER: usize = 1024;

/// Upper bound on fetches in flight at once
pub const MAX_CONCURRENT_FETCHES: usize = 65_536;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_persistence_config(&config.persistence)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    let seed = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            config.seed_url
        )));
    }

    if config.depth_limit == Some(0) {
        return Err(ConfigError::Validation(
            "depth_limit must be >= 1 when set (the seed is depth 1)".to_string(),
        ));
    }

    if config.frontier_capacity == Some(0) {
        return Err(ConfigError::Validation(
            "frontier_capacity must be >= 1 when set".to_string(),
        ));
    }

    for (name, value) in [
        ("worker_multiplier", config.worker_multiplier),
        ("max_concurrent_fetches", config.max_concurrent_fetches),
        ("connections_per_host", config.connections_per_host),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    for (name, value, max) in [
        (
            "worker_multiplier",
            config.worker_multiplier,
            MAX_WORKER_MULTIPLIER,
        ),
        (
            "max_concurrent_fetches",
            config.max_concurrent_fetches,
            MAX_CONCURRENT_FETCHES,
        ),
    ] {
        if value > max {
            return Err(ConfigError::Validation(format!(
                "{} must be <= {}, got {}",
                name, max, value
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent header cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    FilePattern::parse(&config.file_pattern)?;

    if !config.max_file_size_mb.is_finite() || config.max_file_size_mb <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "max_file_size_mb must be a positive number, got {}",
            config.max_file_size_mb
        )));
    }

    if config.buffer_size < 1 {
        return Err(ConfigError::Validation(format!(
            "buffer_size must be >= 1, got {}",
            config.buffer_size
        )));
    }

    Ok(())
}

/// Validates persistence configuration
fn validate_persistence_config(config: &PersistenceConfig) -> ConfigResult<()> {
    if config.enabled && config.visited_path.is_empty() {
        return Err(ConfigError::Validation(
            "visited_path cannot be empty when persistence is enabled".to_string(),
        ));
    }

    Ok(())
}
