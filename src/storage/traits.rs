//! Storage traits and error types
//!
//! This module defines the trait interface for the on-disk primitives the
//! crawler relies on: appending text to a file, loading and saving the
//! visited-set checkpoint, and listing file sizes for rotation.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {source}")]
    Serialization {
        path: String,
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn serialization(path: &Path, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A regular file found in a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name without the directory
    pub name: String,

    /// Size in bytes
    pub size: u64,
}

/// Trait for storage backend implementations
///
/// Implementations must be shareable across tasks; the text processor and the
/// coordinator both hold a handle.
pub trait Storage: Send + Sync {
    /// Appends `text` to the file at `path`, creating it if necessary
    fn append(&self, path: &Path, text: &str) -> StorageResult<()>;

    /// Loads a JSON array of strings from `path`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(values))` - The file existed and parsed
    /// * `Ok(None)` - The file does not exist
    /// * `Err(StorageError)` - The file could not be read or is not a string array
    fn load_string_set(&self, path: &Path) -> StorageResult<Option<Vec<String>>>;

    /// Writes `values` as a JSON array to `path`, replacing any previous content
    fn save_string_set(&self, path: &Path, values: &[String]) -> StorageResult<()>;

    /// Lists the regular files directly inside `dir`
    ///
    /// A missing directory yields an empty listing.
    fn list_files(&self, dir: &Path) -> StorageResult<Vec<FileEntry>>;
}
