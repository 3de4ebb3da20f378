//! Text-Harvest main entry point
//!
//! This is the command-line interface for the Text-Harvest corpus crawler.

use clap::Parser;
use std::path::PathBuf;
use text_harvest::config::{load_config_with_hash, validate, Config};
use text_harvest::crawler::run_crawl;
use text_harvest::output::log_summary;
use tracing_subscriber::EnvFilter;

/// Text-Harvest: a breadth-first text corpus crawler
///
/// Text-Harvest crawls outward from a seed page, keeps the readable text of
/// every HTML page it reaches, drops duplicates, and appends the result to
/// size-rotated, delimiter-wrapped output files.
#[derive(Parser, Debug)]
#[command(name = "text-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A breadth-first text corpus crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore an existing visited-set checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate config and print it without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            let cfg = Config::default();
            validate(&cfg)?;
            cfg
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("text_harvest=info,warn"),
            1 => EnvFilter::new("text_harvest=debug,info"),
            2 => EnvFilter::new("text_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Text-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    match config.crawler.depth_limit {
        Some(limit) => println!("  Depth limit: {}", limit),
        None => println!("  Depth limit: unlimited"),
    }
    match config.crawler.frontier_capacity {
        Some(capacity) => println!("  Frontier capacity: {}", capacity),
        None => println!("  Frontier capacity: unbounded"),
    }
    println!(
        "  Workers: {} per CPU ({} total)",
        config.crawler.worker_multiplier,
        config.crawler.worker_count()
    );
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!(
        "  Connections per host: {}",
        config.crawler.connections_per_host
    );

    println!("\nUser Agent: {}", config.user_agent.header);
    println!("Readability: {}", config.text.readability);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File pattern: {}", config.output.file_pattern);
    println!("  Max size: {} MB", config.output.max_file_size_mb);
    println!("  Rotation measure: {:?}", config.output.rotation_measure);
    println!("  Buffer size: {}", config.output.buffer_size);
    println!(
        "  Delimiters: {} ... {}",
        config.output.start_token, config.output.end_token
    );

    println!("\nPersistence:");
    if config.persistence.enabled {
        println!("  Visited checkpoint: {}", config.persistence.visited_path);
    } else {
        println!("  Disabled");
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring visited checkpoint)");
    } else {
        tracing::info!("Starting crawl");
    }

    match run_crawl(config, fresh).await {
        Ok(summary) => {
            log_summary(&summary);
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
