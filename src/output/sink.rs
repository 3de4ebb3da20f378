//! Output sink: delimited records in size-rotated files
//!
//! Records are appended to `<directory>/<pattern with index>`. After every
//! write the output size is measured; once it reaches the ceiling the file
//! index moves forward by one. Rotation never renames, compacts, or reopens a
//! previous file.

use crate::config::{OutputConfig, RotationMeasure};
use crate::storage::{FileEntry, Storage, StorageResult};
use crate::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const PLACEHOLDER: &str = "{}";

/// Output file name template with a single `{}` index placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    prefix: String,
    suffix: String,
}

impl FilePattern {
    /// Parses a pattern such as `data{}.txt`
    ///
    /// The pattern must contain exactly one `{}` and no path separators.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        if pattern.contains('/') || pattern.contains('\\') {
            return Err(ConfigError::InvalidPattern(format!(
                "'{}' must be a file name, not a path",
                pattern
            )));
        }

        let mut parts = pattern.split(PLACEHOLDER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(suffix), None) => Ok(Self {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            }),
            _ => Err(ConfigError::InvalidPattern(format!(
                "'{}' must contain exactly one '{}'",
                pattern, PLACEHOLDER
            ))),
        }
    }

    /// File name for `index`
    pub fn file_name(&self, index: u32) -> String {
        format!("{}{}{}", self.prefix, index, self.suffix)
    }

    /// Index encoded in `name`, if `name` belongs to this file family
    pub fn index_of(&self, name: &str) -> Option<u32> {
        let digits = name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// What a single flush did
#[derive(Debug, Clone, PartialEq)]
pub struct FlushReport {
    /// Index of the file the records went to
    pub file_index: u32,

    /// Number of records appended
    pub records_written: usize,

    /// Measured output size after the write, in megabytes
    pub size_mb: f64,

    /// True if the ceiling was reached and the next flush targets a new file
    pub rotated: bool,
}

/// Writes delimited records and rotates output files by size
pub struct OutputSink {
    storage: Arc<dyn Storage>,
    directory: PathBuf,
    pattern: FilePattern,
    measure: RotationMeasure,
    max_size_mb: f64,
    start_token: String,
    end_token: String,
    file_index: u32,
    records_written: u64,
}

impl OutputSink {
    /// Creates a sink and picks the file index to write to
    ///
    /// Existing files of the same family are honored: writing resumes at the
    /// highest index found, or one past it if the size ceiling is already met.
    pub fn new(config: &OutputConfig, storage: Arc<dyn Storage>) -> crate::Result<Self> {
        let pattern = FilePattern::parse(&config.file_pattern)?;

        let mut sink = Self {
            storage,
            directory: PathBuf::from(&config.directory),
            pattern,
            measure: config.rotation_measure,
            max_size_mb: config.max_file_size_mb,
            start_token: config.start_token.clone(),
            end_token: config.end_token.clone(),
            file_index: 0,
            records_written: 0,
        };

        let files = sink.storage.list_files(&sink.directory)?;
        if let Some(highest) = files.iter().filter_map(|f| sink.pattern.index_of(&f.name)).max() {
            sink.file_index = highest;
            if sink.size_of(&files) >= sink.max_size_mb {
                sink.file_index = highest + 1;
            }
            tracing::info!(
                "Resuming output at {}",
                sink.current_path().display()
            );
        }

        Ok(sink)
    }

    /// Index of the file the next flush writes to
    pub fn file_index(&self) -> u32 {
        self.file_index
    }

    /// Path of the file the next flush writes to
    pub fn current_path(&self) -> PathBuf {
        self.directory.join(self.pattern.file_name(self.file_index))
    }

    /// Total records written by this sink
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Wraps one record in the configured delimiters, newline-terminated
    pub fn format_record(&self, text: &str) -> String {
        format!("{}{}{}\n", self.start_token, text, self.end_token)
    }

    /// Appends `records` to the current file, then measures and rotates
    ///
    /// An empty batch writes nothing (no empty file is created) but still
    /// measures, so the caller can report progress.
    pub fn write(&mut self, records: &[String]) -> StorageResult<FlushReport> {
        let file_index = self.file_index;

        if !records.is_empty() {
            let mut chunk = String::new();
            for record in records {
                chunk.push_str(&self.format_record(record));
            }
            self.storage.append(&self.current_path(), &chunk)?;
            self.records_written += records.len() as u64;
        }

        let size_mb = self.measure_mb()?;
        let rotated = size_mb >= self.max_size_mb;
        if rotated {
            self.file_index += 1;
            tracing::info!(
                "Output reached {:.2} MB (ceiling {:.2} MB), rotating to {}",
                size_mb,
                self.max_size_mb,
                self.current_path().display()
            );
        }

        Ok(FlushReport {
            file_index,
            records_written: records.len(),
            size_mb,
            rotated,
        })
    }

    /// Current output size in megabytes under the configured measure
    pub fn measure_mb(&self) -> StorageResult<f64> {
        let files = self.storage.list_files(&self.directory)?;
        Ok(self.size_of(&files))
    }

    fn size_of(&self, files: &[FileEntry]) -> f64 {
        let bytes: u64 = files
            .iter()
            .filter(|f| match self.measure {
                RotationMeasure::FileFamily => self.pattern.index_of(&f.name).is_some(),
                RotationMeasure::Directory => true,
            })
            .map(|f| f.size)
            .sum();
        bytes as f64 / BYTES_PER_MB
    }
}
