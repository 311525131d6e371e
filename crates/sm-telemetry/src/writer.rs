//! JSON persistence for the guard log.
//!
//! The log file holds one JSON array of records, oldest first. Writes go to a
//! temporary sibling that is renamed over the target, so readers never see a
//! partial file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::entry::GuardLogEntry;
use crate::retention::{LogStore, LogStoreConfig};

/// Errors from log persistence.
#[derive(Error, Debug)]
pub enum LogStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LogStoreError>;

/// Guard log backed by a JSON file.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records. A missing file reads as empty.
    pub fn load(&self) -> Result<Vec<GuardLogEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the file's contents with `entries`.
    pub fn save(&self, entries: &[GuardLogEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec(entries)?)?;
        atomic_rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = entries.len(), "guard log saved");
        Ok(())
    }

    /// Load the file into a store governed by `config`.
    pub fn open_store(&self, config: LogStoreConfig) -> Result<LogStore> {
        let mut store = LogStore::new(config);
        store.hydrate(self.load()?);
        Ok(store)
    }

    /// Write the store's surviving records back to the file.
    pub fn persist(&self, store: &mut LogStore) -> Result<()> {
        store.prune();
        self.save(store.entries())
    }
}

fn atomic_rename(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path)?;
    Ok(())
}
