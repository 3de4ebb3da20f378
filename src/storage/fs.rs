//! Filesystem storage implementation
//!
//! This module provides the `std::fs` based implementation of the Storage trait.

use crate::storage::traits::{FileEntry, Storage, StorageError, StorageResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Local filesystem storage backend
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Creates a new FsStorage instance
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FsStorage {
    fn append(&self, path: &Path, text: &str) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;

        file.write_all(text.as_bytes())
            .map_err(|e| StorageError::io(path, e))?;
        file.flush().map_err(|e| StorageError::io(path, e))
    }

    fn load_string_set(&self, path: &Path) -> StorageResult<Option<Vec<String>>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };

        let values: Vec<String> =
            serde_json::from_str(&content).map_err(|e| StorageError::serialization(path, e))?;

        Ok(Some(values))
    }

    fn save_string_set(&self, path: &Path, values: &[String]) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let json = serde_json::to_string(values).map_err(|e| StorageError::serialization(path, e))?;
        fs::write(path, json).map_err(|e| StorageError::io(path, e))
    }

    fn list_files(&self, dir: &Path) -> StorageResult<Vec<FileEntry>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(dir, e))?;
            let metadata = entry.metadata().map_err(|e| StorageError::io(&entry.path(), e))?;
            if !metadata.is_file() {
                continue;
            }
            files.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
            });
        }

        Ok(files)
    }
}
