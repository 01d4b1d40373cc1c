//! Durable key-value storage port.
//!
//! Stores persist whole documents by key through the [`Storage`] trait and
//! never see the backend. [`FileStorage`] keeps one JSON file per key on
//! disk; [`MemoryStorage`] keeps everything in a map and can be told to fail
//! writes, which is how tests exercise the persistence error path.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use taskboard_model::record::RecordError;

/// Errors that can occur while reading or writing a record.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The document could not be encoded or decoded.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Whole-document key-value storage.
///
/// Writes replace the previous document entirely. A failed write must leave
/// the previous document readable.
pub trait Storage: Send + Sync {
    /// Returns the document stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replaces the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Deletes the document stored under `key`. Removing a missing key is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend refuses the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`Storage`] for tests and ephemeral boards.
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record, bypassing the failure switch.
    #[must_use]
    pub fn with_record(self, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.records.lock().insert(key.to_string(), bytes.into());
        self
    }

    /// Makes every subsequent write and removal fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.check_writable()?;
        self.records.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.records.lock().remove(key);
        Ok(())
    }
}

/// [`Storage`] backed by a directory with one `<key>.json` file per record.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so an interrupted write never truncates the old document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Uses `root` as the data directory. It is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, bytes).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}
