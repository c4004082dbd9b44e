//! In-memory store.
//!
//! Clones share the same map and notification channel, so two carts built
//! from clones of one `MemoryStore` behave like two tabs of one origin.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use super::{
    EVENT_CAPACITY, KeyValueStore, StorageError, StorageEvent, StorageEvents, TabId, notify,
};

#[derive(Debug, Default)]
struct Slots {
    values: HashMap<String, String>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl Slots {
    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

/// Cloneable in-memory slot store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    slots: Arc<Mutex<Slots>>,
    tx: broadcast::Sender<StorageEvent>,
}

impl MemoryStore {
    /// An empty store without a quota.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            slots: Arc::new(Mutex::new(Slots::default())),
            tx,
        }
    }

    /// An empty store that rejects writes once keys plus values exceed
    /// `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.quota_bytes = Some(quota_bytes);
        }
        store
    }

    /// Turn the store off or back on. A disabled store fails every call with
    /// [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.disabled = !available;
        }
    }

    /// Write a slot without announcing it, as if another process changed
    /// the backing data behind this handle.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the store is disabled.
    pub fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slots>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Unavailable)?;
        if slots.disabled {
            return Err(StorageError::Unavailable);
        }
        Ok(slots)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str, origin: TabId) -> Result<(), StorageError> {
        {
            let mut slots = self.lock()?;
            if let Some(quota) = slots.quota_bytes {
                let needed = slots.used_bytes_with(key, value);
                if needed > quota {
                    return Err(StorageError::QuotaExceeded { needed, quota });
                }
            }
            slots.values.insert(key.to_owned(), value.to_owned());
        }
        notify(&self.tx, key, origin);
        Ok(())
    }

    fn remove(&self, key: &str, origin: TabId) -> Result<(), StorageError> {
        let existed = self.lock()?.values.remove(key).is_some();
        if existed {
            notify(&self.tx, key, origin);
        }
        Ok(())
    }

    fn subscribe(&self) -> StorageEvents {
        StorageEvents::new(self.tx.subscribe())
    }
}
