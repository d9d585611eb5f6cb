//! JSON document file storage with ACID guarantees.
//!
//! Provides a smart mutex-like layer for safe concurrent access to a single
//! JSON document on disk. Returns data as `serde_json::Value` so callers
//! decide how to interpret it.

use serde_json::Value as JsonValue;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// Errors that can occur during JSON file storage operations.
#[derive(Debug)]
pub enum JsonFileStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing or serialization error.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
    /// The document does not have the expected shape.
    InvalidDocument(String),
}

impl std::fmt::Display for JsonFileStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonFileStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            JsonFileStorageError::JsonError(e) => write!(f, "JSON error: {}", e),
            JsonFileStorageError::LockError(e) => write!(f, "Lock error: {}", e),
            JsonFileStorageError::InvalidDocument(e) => write!(f, "Invalid document: {}", e),
        }
    }
}

impl std::error::Error for JsonFileStorageError {}

impl From<std::io::Error> for JsonFileStorageError {
    fn from(e: std::io::Error) -> Self {
        JsonFileStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for JsonFileStorageError {
    fn from(e: serde_json::Error) -> Self {
        JsonFileStorageError::JsonError(e)
    }
}

/// A JSON file storage with ACID guarantees.
///
/// Responsibilities:
/// - **File locking** (exclusive lock around `update`)
/// - **Atomic writes** (tmp file + atomic rename)
///
/// Does NOT:
/// - Know about visit records or any other entity
/// - Interpret keys inside the document
///
/// Readers never take the lock: a rename replaces the document in one step,
/// so `load` sees either the previous or the next version.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates a new storage handle for the JSON file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file and parses it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(JsonValue))`: Successfully loaded
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<JsonValue>, JsonFileStorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Saves data to the file atomically.
    ///
    /// Uses a temporary file + atomic rename to ensure durability.
    pub fn save(&self, data: &JsonValue) -> Result<(), JsonFileStorageError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json_string = serde_json::to_string_pretty(data)?;

        // Write to temporary file in the same directory
        let tmp_path = self.get_temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json_string.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        // Atomic rename
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a transactional update with file locking.
    ///
    /// The update function receives a mutable reference to the current data
    /// and can modify it. If the function returns `Ok(())`, the changes are
    /// atomically written back to the file.
    pub fn update<F>(&self, default_value: JsonValue, f: F) -> Result<(), JsonFileStorageError>
    where
        F: FnOnce(&mut JsonValue) -> Result<(), JsonFileStorageError>,
    {
        // Acquire exclusive lock
        let _lock = self.acquire_lock()?;

        let mut data = self.load()?.unwrap_or(default_value);

        f(&mut data)?;

        self.save(&data)?;

        Ok(())
    }

    /// Gets a temporary file path for atomic writes.
    fn get_temp_path(&self) -> Result<PathBuf, JsonFileStorageError> {
        let parent = self.path.parent().ok_or_else(|| {
            JsonFileStorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            JsonFileStorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }

    fn acquire_lock(&self) -> Result<FileLock, JsonFileStorageError> {
        FileLock::acquire(&self.path)
    }
}

/// A file lock guard. The lock is released when the handle is dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    /// Acquires an exclusive lock on a sibling `.lock` file of `path`.
    fn acquire(path: &Path) -> Result<Self, JsonFileStorageError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive().map_err(|e| {
            JsonFileStorageError::LockError(format!("Failed to acquire lock: {}", e))
        })?;

        Ok(FileLock { file })
    }
}
