//! Persisted session records.
//!
//! A record is one opaque string written and erased as a unit. [`FileStorage`]
//! keeps it in `<dir>/<key>.json` and replaces the file by renaming a fully
//! written temporary file over it, so readers never see a partial write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Storage key used by the original web client.
pub const DEFAULT_STORAGE_KEY: &str = "gotaskpro_auth";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to replace session record: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous key/value slot holding the serialized session.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> StorageResult<Option<String>>;

    fn save(&self, record: &str) -> StorageResult<()>;

    fn clear(&self) -> StorageResult<()>;
}

pub struct FileStorage {
    dir: PathBuf,
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(format!("{}.json", key));
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> StorageResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, record: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(record.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(path = ?self.path, "Session record written");
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "Session record removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, used for ephemeral sessions and tests.
#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    pub fn record(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, record: &str) -> StorageResult<()> {
        *self.slot() = Some(record.to_string());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        *self.slot() = None;
        Ok(())
    }
}
