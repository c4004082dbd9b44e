//! Directory-backed store: one file per slot.
//!
//! Writes go to a uniquely named temporary sibling first and are renamed
//! into place, so a reader never sees a half-written slot and concurrent
//! writers never share a temp file. Change notifications reach every
//! subscriber of this handle and its clones; other processes pointing at the
//! same directory see the new data on their next read.

use std::fmt::Write as _;
use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use super::{
    EVENT_CAPACITY, KeyValueStore, StorageError, StorageEvent, StorageEvents, TabId, notify,
};

const SLOT_EXTENSION: &str = "json";

/// Slot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    tx: broadcast::Sender<StorageEvent>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self { dir, tx })
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for an empty key.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self
            .dir
            .join(format!("{}.{SLOT_EXTENSION}", encode_key(key)?)))
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_-]` so any key maps to a
/// portable file name and distinct keys never collide.
fn encode_key(key: &str) -> Result<String, StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    Ok(out)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn set(&self, key: &str, value: &str, origin: TabId) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        // Dropped (and deleted) on any error before `persist`.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "Slot written");
        notify(&self.tx, key, origin);
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str, origin: TabId) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Slot removed");
                notify(&self.tx, key, origin);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self) -> StorageEvents {
        StorageEvents::new(self.tx.subscribe())
    }
}
