//! Durable key-value slots.
//!
//! The quote cart persists itself into a single string-keyed slot, the way a
//! browser page writes to local storage. Every backend shares one contract:
//!
//! - values are opaque strings (the callers write JSON)
//! - every write names the [`TabId`] that made it
//! - every successful write or removal is announced to subscribers as a
//!   [`StorageEvent`], so other cart instances on the same backend can reload
//!
//! Notifications are best-effort. A receiver that falls behind gets
//! [`StorageNotice::Lagged`] and should reload everything it cares about.

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Buffered notifications per subscriber before it starts lagging.
pub(crate) const EVENT_CAPACITY: usize = 64;

/// Errors that can occur when reading or writing a slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is disabled or its lock is poisoned.
    #[error("storage unavailable")]
    Unavailable,

    /// The write would exceed the backend quota.
    #[error("storage quota exceeded (needed {needed} bytes, quota {quota} bytes)")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// The key cannot be stored by this backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("failed to encode slot value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Identity of one cart instance ("tab") writing to a shared store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    /// A fresh random tab id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A slot changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that was written or removed.
    pub key: String,
    /// Tab that made the change.
    pub origin: TabId,
}

/// What a subscriber sees next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageNotice {
    /// A slot changed.
    Changed(StorageEvent),
    /// This many events were dropped; state may have changed arbitrarily.
    Lagged(u64),
}

/// Subscription to a store's change notifications.
#[derive(Debug)]
pub struct StorageEvents {
    rx: broadcast::Receiver<StorageEvent>,
}

impl StorageEvents {
    pub(crate) const fn new(rx: broadcast::Receiver<StorageEvent>) -> Self {
        Self { rx }
    }

    /// Next pending notice without waiting. `None` when nothing is queued.
    pub fn try_next(&mut self) -> Option<StorageNotice> {
        match self.rx.try_recv() {
            Ok(event) => Some(StorageNotice::Changed(event)),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Some(StorageNotice::Lagged(n)),
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                None
            }
        }
    }

    /// Wait for the next notice. `None` once the store is dropped.
    pub async fn recv(&mut self) -> Option<StorageNotice> {
        match self.rx.recv().await {
            Ok(event) => Some(StorageNotice::Changed(event)),
            Err(broadcast::error::RecvError::Lagged(n)) => Some(StorageNotice::Lagged(n)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

/// A durable string-keyed slot store.
///
/// Writes replace the whole value of a slot. There is no partial update and
/// no locking across writers: the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` if it was never written or was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable, over quota, or the
    /// write fails.
    fn set(&self, key: &str, value: &str, origin: TabId) -> Result<(), StorageError>;

    /// Delete a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable or the delete fails.
    fn remove(&self, key: &str, origin: TabId) -> Result<(), StorageError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> StorageEvents;
}

/// Shared handle to a store, as injected into carts and the context.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Announce a change. No subscribers is fine.
pub(crate) fn notify(tx: &broadcast::Sender<StorageEvent>, key: &str, origin: TabId) {
    let _ = tx.send(StorageEvent {
        key: key.to_owned(),
        origin,
    });
}
