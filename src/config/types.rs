use serde::Deserialize;

/// Main configuration structure for Text-Harvest
///
/// Every section has defaults, so an empty TOML file (or no file at all)
/// yields a runnable crawler.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub text: TextConfig,
    pub output: OutputConfig,
    pub persistence: PersistenceConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// The page the crawl starts from (depth 1)
    pub seed_url: String,

    /// Deepest depth that is still fetched; None crawls without limit
    pub depth_limit: Option<u32>,

    /// Maximum number of queued frontier items; None is unbounded
    pub frontier_capacity: Option<usize>,

    /// Fetch workers spawned per logical CPU
    pub worker_multiplier: usize,

    /// Maximum number of fetches in flight at once, independent of worker count
    pub max_concurrent_fetches: usize,

    /// Connection pool size kept per host by the HTTP client
    pub connections_per_host: usize,
}

impl CrawlerConfig {
    /// Number of fetch workers: logical CPUs times `worker-multiplier`
    pub fn worker_count(&self) -> usize {
        num_cpus::get()
            .max(1)
            .saturating_mul(self.worker_multiplier)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: "https://pl.wikipedia.org/wiki/J%C4%99zyk_programowania".to_string(),
            depth_limit: None,
            frontier_capacity: Some(5_000_000),
            worker_multiplier: 4,
            max_concurrent_fetches: 5,
            connections_per_host: 40,
        }
    }
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Value sent in the `User-Agent` header
    pub header: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            header: "Mozilla/5.0".to_string(),
        }
    }
}

/// Text extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Reduce each page to its main content before extracting text
    pub readability: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { readability: true }
    }
}

/// How the output size is measured for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationMeasure {
    /// Sum of the files in the output directory matching the file pattern
    #[default]
    FileFamily,

    /// Sum of every regular file in the output directory
    Directory,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the output files are written to
    pub directory: String,

    /// File name with a single `{}` placeholder for the file index
    pub file_pattern: String,

    /// Size ceiling in megabytes that triggers rotation
    pub max_file_size_mb: f64,

    /// Number of buffered records that triggers a flush
    pub buffer_size: usize,

    /// Delimiter written before each record
    pub start_token: String,

    /// Delimiter written after each record
    pub end_token: String,

    /// What the size ceiling is compared against
    pub rotation_measure: RotationMeasure,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_pattern: "clean_scraped_data{}.txt".to_string(),
            max_file_size_mb: 1000.0,
            buffer_size: 10,
            start_token: "<|startoftext|>".to_string(),
            end_token: "<|endoftext|>".to_string(),
            rotation_measure: RotationMeasure::FileFamily,
        }
    }
}

/// Visited-set checkpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PersistenceConfig {
    /// Load the visited set on start and checkpoint it on every flush
    pub enabled: bool,

    /// Path of the JSON checkpoint file
    pub visited_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            visited_path: "visited.json".to_string(),
        }
    }
}
