//! The quote cart.
//!
//! A `QuoteCart` is one tab's view of the selected line items. It is built
//! around an injected [`SharedStore`] and writes the whole item list back to
//! its slot after every mutation. Several carts can share a store; each one
//! reloads when another tab changes its slot.
//!
//! # Invariants
//!
//! - No stored item has `quantity == 0`.
//! - `total_price()` equals the sum of `unit_price * quantity` over all items.
//!   It is recomputed from the items after every mutation and every load.
//! - Storage failures never reach the caller. They downgrade the cart to
//!   memory-only until the next successful write; see [`QuoteCart::save_status`].

use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};
use yotech_quote_core::{LineItem, LineItemId, Price};

use crate::persisted;
use crate::storage::{SharedStore, StorageEvent, StorageEvents, StorageNotice, TabId};

/// Slot used by the browser app for the cart, kept for compatibility.
pub const DEFAULT_CART_KEY: &str = "quoteItems";

/// Outcome of the most recent attempt to touch durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// The slot matches the in-memory cart (or nothing has been written yet).
    #[default]
    Saved,
    /// The last read or write failed; the cart only lives in memory.
    MemoryOnly {
        /// Human readable failure, suitable for a "could not save" notice.
        reason: String,
    },
}

impl SaveStatus {
    /// True when the last storage access failed.
    #[must_use]
    pub const fn is_memory_only(&self) -> bool {
        matches!(self, Self::MemoryOnly { .. })
    }
}

/// Insertion-ordered line items with a derived total, persisted per mutation.
pub struct QuoteCart {
    store: SharedStore,
    key: String,
    tab: TabId,
    events: StorageEvents,
    items: IndexMap<LineItemId, LineItem>,
    total: Price,
    status: SaveStatus,
}

impl std::fmt::Debug for QuoteCart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteCart")
            .field("key", &self.key)
            .field("tab", &self.tab)
            .field("items", &self.items.len())
            .field("total", &self.total)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl QuoteCart {
    /// Empty cart on the default slot. Call [`load_from_storage`] to rehydrate.
    ///
    /// [`load_from_storage`]: Self::load_from_storage
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self::with_key(store, DEFAULT_CART_KEY)
    }

    /// Empty cart on a custom slot.
    #[must_use]
    pub fn with_key(store: SharedStore, key: impl Into<String>) -> Self {
        let events = store.subscribe();
        Self {
            store,
            key: key.into(),
            tab: TabId::new(),
            events,
            items: IndexMap::new(),
            total: Price::ZERO,
            status: SaveStatus::Saved,
        }
    }

    /// Cart on the default slot, rehydrated from storage.
    #[must_use]
    pub fn open(store: SharedStore) -> Self {
        let mut cart = Self::new(store);
        cart.load_from_storage();
        cart
    }

    // =========================================================================
    // Read model
    // =========================================================================

    /// Items in insertion order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &LineItem> + '_ {
        self.items.values()
    }

    /// Look up one item.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.get(id)
    }

    /// True if `id` is in the cart.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Sum of `unit_price * quantity` over all items.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.values().map(|i| u64::from(i.quantity)).sum()
    }

    /// Result of the last storage access.
    #[must_use]
    pub const fn save_status(&self) -> &SaveStatus {
        &self.status
    }

    /// Slot this cart persists to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Identity this cart writes under.
    #[must_use]
    pub const fn tab(&self) -> TabId {
        self.tab
    }

    /// Store this cart persists to.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Upsert with replace: set the item to exactly what was passed.
    ///
    /// An existing entry keeps its position but takes the incoming quantity
    /// and data. A zero quantity removes the entry.
    pub fn add_or_replace(&mut self, item: LineItem) {
        if !item.is_present() {
            self.remove(item.id.as_str());
            return;
        }
        debug!(id = %item.id, quantity = item.quantity, "Setting line item");
        self.items.insert(item.id.clone(), item);
        self.commit();
    }

    /// Additive add: put `item.quantity` more of the item into the cart.
    ///
    /// An existing entry keeps its data and gains the quantity (saturating).
    /// A missing entry is appended as passed. Adding zero changes nothing.
    pub fn increment_by(&mut self, item: LineItem) {
        if !item.is_present() {
            return;
        }
        match self.items.get_mut(&item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                debug!(id = %item.id, quantity = existing.quantity, "Incremented line item");
            }
            None => {
                debug!(id = %item.id, quantity = item.quantity, "Added line item");
                self.items.insert(item.id.clone(), item);
            }
        }
        self.commit();
    }

    /// Set the quantity of an existing item. `quantity <= 0` removes it.
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        let Some(item) = self.items.get_mut(id) else {
            debug!(id, "Ignoring quantity update for unknown item");
            return;
        };
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.commit();
    }

    /// Remove an item. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) {
        if self.items.shift_remove(id).is_some() {
            debug!(id, "Removed line item");
            self.commit();
        }
    }

    /// Remove everything and persist the empty cart.
    pub fn clear(&mut self) {
        self.items.clear();
        info!(key = %self.key, "Cleared quote cart");
        self.commit();
    }

    /// Replace in-memory state with the slot's contents.
    ///
    /// A missing slot yields an empty cart. An unreadable payload yields an
    /// empty cart and the slot is removed; if that removal fails the cart is
    /// marked memory-only. If the store itself cannot be read, in-memory
    /// state is kept.
    #[instrument(skip(self), fields(key = %self.key, tab = %self.tab))]
    pub fn load_from_storage(&mut self) {
        let raw = match self.store.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Could not read quote cart, keeping in-memory state");
                self.status = SaveStatus::MemoryOnly {
                    reason: e.to_string(),
                };
                return;
            }
        };

        let mut status = SaveStatus::Saved;
        let items = match raw.as_deref().map(persisted::decode) {
            None => Vec::new(),
            Some(Ok(items)) => items,
            Some(Err(e)) => {
                warn!(error = %e, "Discarding unreadable quote cart");
                if let Err(e) = self.store.remove(&self.key, self.tab) {
                    warn!(error = %e, "Could not clear unreadable quote cart");
                    status = SaveStatus::MemoryOnly {
                        reason: e.to_string(),
                    };
                }
                Vec::new()
            }
        };

        self.items = items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();
        self.recompute_total();
        self.status = status;
        debug!(items = self.items.len(), total = %self.total, "Loaded quote cart");
    }

    // =========================================================================
    // Cross-tab sync
    // =========================================================================

    /// React to one change notification. Reloads and returns `true` when the
    /// event is for this cart's slot and came from another tab.
    pub fn handle_storage_event(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.key || event.origin == self.tab {
            return false;
        }
        debug!(origin = %event.origin, "Slot changed in another tab");
        self.load_from_storage();
        true
    }

    /// Drain pending notifications and reload at most once. Returns `true`
    /// if the cart was reloaded.
    pub fn sync_external_changes(&mut self) -> bool {
        let mut stale = false;
        while let Some(notice) = self.events.try_next() {
            match notice {
                StorageNotice::Changed(event) => {
                    stale |= event.key == self.key && event.origin != self.tab;
                }
                StorageNotice::Lagged(missed) => {
                    debug!(missed, "Missed storage notifications");
                    stale = true;
                }
            }
        }
        if stale {
            self.load_from_storage();
        }
        stale
    }

    /// Wait for the next change made by another tab to this cart's slot,
    /// then reload. Returns `false` once the store has gone away.
    pub async fn next_external_change(&mut self) -> bool {
        while let Some(notice) = self.events.recv().await {
            let relevant = match &notice {
                StorageNotice::Changed(event) => {
                    event.key == self.key && event.origin != self.tab
                }
                StorageNotice::Lagged(_) => true,
            };
            if relevant {
                self.load_from_storage();
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn recompute_total(&mut self) {
        self.total = self
            .items
            .values()
            .map(|item| item.line_total().unwrap_or(Price::MAX))
            .sum();
    }

    /// Recompute derived state, then write the whole cart back.
    fn commit(&mut self) {
        self.recompute_total();
        self.persist();
    }

    fn persist(&mut self) {
        let result = persisted::encode(self.items.values())
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.store
                    .set(&self.key, &raw, self.tab)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => self.status = SaveStatus::Saved,
            Err(reason) => {
                warn!(key = %self.key, error = %reason, "Could not save quote cart, keeping it in memory");
                self.status = SaveStatus::MemoryOnly { reason };
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, StorageError};

    fn price(v: i64) -> Price {
        Price::from_major(v).unwrap()
    }

    fn item(id: &str, unit_price: i64, quantity: u32) -> LineItem {
        LineItem::builder(id, price(unit_price))
            .unit("m²")
            .quantity(quantity)
            .build()
            .unwrap()
    }

    fn cart() -> (MemoryStore, QuoteCart) {
        let store = MemoryStore::new();
        let cart = QuoteCart::new(Arc::new(store.clone()));
        (store, cart)
    }

    fn ids(cart: &QuoteCart) -> Vec<&str> {
        cart.items().map(|i| i.id.as_str()).collect()
    }

    fn expected_total(cart: &QuoteCart) -> Price {
        cart.items().map(|i| i.unit_price.times(i.quantity).unwrap()).sum()
    }

    #[test]
    fn test_scenario_add_update_remove() {
        let (_, mut cart) = cart();

        cart.add_or_replace(item("p1", 100_000, 2));
        assert_eq!(cart.total_price(), price(200_000));
        assert_eq!(ids(&cart), vec!["p1"]);

        cart.update_quantity("p1", 5);
        assert_eq!(cart.total_price(), price(500_000));

        cart.update_quantity("p1", 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let (_, mut cart) = cart();
        cart.add_or_replace(item("p2", 50_000, 1));
        cart.remove("p2");
        cart.remove("p2");
        assert!(cart.is_empty());
        assert_eq!(cart.save_status(), &SaveStatus::Saved);
    }

    #[test]
    fn test_add_or_replace_replaces_quantity() {
        let (_, mut cart) = cart();
        cart.add_or_replace(item("p1", 10, 2));
        cart.add_or_replace(item("p2", 1, 1));
        cart.add_or_replace(item("p1", 10, 7));
        assert_eq!(cart.get("p1").unwrap().quantity, 7);
        assert_eq!(ids(&cart), vec!["p1", "p2"]);
        assert_eq!(cart.total_price(), price(71));
    }

    #[test]
    fn test_add_or_replace_zero_removes() {
        let (_, mut cart) = cart();
        cart.add_or_replace(item("p1", 10, 2));
        cart.add_or_replace(item("p1", 10, 0));
        assert!(!cart.contains("p1"));
    }

    #[test]
    fn test_increment_by_sums_quantity() {
        let (_, mut cart) = cart();
        cart.increment_by(item("p1", 10, 2));
        cart.increment_by(item("p1", 10, 3));
        assert_eq!(cart.get("p1").unwrap().quantity, 5);
        assert_eq!(cart.total_price(), price(50));

        cart.increment_by(item("p1", 10, 0));
        assert_eq!(cart.get("p1").unwrap().quantity, 5);
    }

    #[test]
    fn test_increment_saturates() {
        let (_, mut cart) = cart();
        cart.increment_by(item("p1", 1, u32::MAX));
        cart.increment_by(item("p1", 1, 10));
        assert_eq!(cart.get("p1").unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (store, mut cart) = cart();
        cart.update_quantity("missing", 3);
        assert!(cart.is_empty());
        assert_eq!(store.get(DEFAULT_CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_update_negative_removes() {
        let (_, mut cart) = cart();
        cart.add_or_replace(item("p1", 10, 2));
        cart.update_quantity("p1", -4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_matches_sum_after_every_step() {
        let (_, mut cart) = cart();
        let steps: Vec<Box<dyn Fn(&mut QuoteCart)>> = vec![
            Box::new(|c: &mut QuoteCart| c.add_or_replace(item("a", 333, 3))),
            Box::new(|c: &mut QuoteCart| c.increment_by(item("b", 17, 9))),
            Box::new(|c: &mut QuoteCart| c.update_quantity("a", 11)),
            Box::new(|c: &mut QuoteCart| c.add_or_replace(item("c", 1_000_001, 1))),
            Box::new(|c: &mut QuoteCart| c.remove("b")),
            Box::new(|c: &mut QuoteCart| c.increment_by(item("a", 333, 2))),
            Box::new(|c: &mut QuoteCart| c.update_quantity("c", 0)),
        ];
        for step in steps {
            step(&mut cart);
            assert_eq!(cart.total_price(), expected_total(&cart));
        }
        assert_eq!(cart.total_price(), price(333 * 13));
    }

    #[test]
    fn test_every_mutation_persists() {
        let (store, mut cart) = cart();
        cart.add_or_replace(item("p1", 10, 2));
        let stored = persisted::decode(&store.get(DEFAULT_CART_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);

        cart.clear();
        let stored = persisted::decode(&store.get(DEFAULT_CART_KEY).unwrap().unwrap()).unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_round_trip_through_storage() {
        let (store, mut cart) = cart();
        cart.add_or_replace(item("p1", 100_000, 2));
        cart.increment_by(item("p2", 50_000, 3));

        let reloaded = QuoteCart::open(Arc::new(store));
        let before: Vec<_> = cart.items().cloned().collect();
        let after: Vec<_> = reloaded.items().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(reloaded.total_price(), cart.total_price());
    }

    #[test]
    fn test_load_corrupt_payload_resets_and_clears_slot() {
        let store = MemoryStore::new();
        store.put_raw(DEFAULT_CART_KEY, "not-json").unwrap();

        let cart = QuoteCart::open(Arc::new(store.clone()));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(store.get(DEFAULT_CART_KEY).unwrap(), None);
    }

    /// Reads pass through; every write fails.
    #[derive(Debug)]
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, _: &str, _: &str, _: TabId) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn remove(&self, _: &str, _: TabId) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }

        fn subscribe(&self) -> StorageEvents {
            self.0.subscribe()
        }
    }

    #[test]
    fn test_corrupt_payload_that_cannot_be_cleared_is_memory_only() {
        let store = MemoryStore::new();
        store.put_raw(DEFAULT_CART_KEY, "not-json").unwrap();

        let cart = QuoteCart::open(Arc::new(ReadOnlyStore(store.clone())));
        assert!(cart.is_empty());
        assert_eq!(
            cart.save_status(),
            &SaveStatus::MemoryOnly {
                reason: StorageError::Unavailable.to_string()
            }
        );
        assert_eq!(store.get(DEFAULT_CART_KEY).unwrap().as_deref(), Some("not-json"));
    }

    #[test]
    fn test_load_ignores_stored_total() {
        let store = MemoryStore::new();
        store
            .put_raw(
                DEFAULT_CART_KEY,
                r#"[{"id":"p1","name":"a","unit":"m²","price":100,"quantity":3,"totalPrice":1}]"#,
            )
            .unwrap();
        let cart = QuoteCart::open(Arc::new(store));
        assert_eq!(cart.total_price(), price(300));
    }

    #[test]
    fn test_quota_exceeded_degrades_to_memory() {
        let store = MemoryStore::with_quota(64);
        let mut cart = QuoteCart::new(Arc::new(store.clone()));

        cart.add_or_replace(item("p1", 100, 1));
        assert!(cart.save_status().is_memory_only());
        assert_eq!(cart.total_price(), price(100));
        assert_eq!(store.get(DEFAULT_CART_KEY).unwrap(), None);

        cart.clear();
        assert_eq!(cart.save_status(), &SaveStatus::Saved);
    }

    #[test]
    fn test_unavailable_store_keeps_memory_state() {
        let store = MemoryStore::new();
        let mut cart = QuoteCart::new(Arc::new(store.clone()));
        cart.add_or_replace(item("p1", 100, 1));

        store.set_available(false);
        cart.load_from_storage();
        assert_eq!(ids(&cart), vec!["p1"]);
        assert!(cart.save_status().is_memory_only());

        cart.update_quantity("p1", 4);
        assert_eq!(cart.total_price(), price(400));
        assert!(cart.save_status().is_memory_only());
    }

    #[test]
    fn test_own_writes_do_not_trigger_reload() {
        let (_, mut cart) = cart();
        cart.add_or_replace(item("p1", 10, 1));
        assert!(!cart.sync_external_changes());
    }

    #[test]
    fn test_other_tab_write_triggers_reload() {
        let store = MemoryStore::new();
        let mut first = QuoteCart::new(Arc::new(store.clone()));
        let mut second = QuoteCart::new(Arc::new(store));

        first.add_or_replace(item("p1", 10, 2));
        assert!(second.is_empty());
        assert!(second.sync_external_changes());
        assert_eq!(ids(&second), vec!["p1"]);
        assert_eq!(second.total_price(), price(20));

        // The reload itself wrote nothing, so the first tab stays quiet.
        assert!(!first.sync_external_changes());
    }

    #[test]
    fn test_handle_storage_event_filters_key_and_origin() {
        let (_, mut cart) = cart();
        let own = StorageEvent {
            key: DEFAULT_CART_KEY.to_string(),
            origin: cart.tab(),
        };
        let other_key = StorageEvent {
            key: "category-x-quantities".to_string(),
            origin: TabId::new(),
        };
        let foreign = StorageEvent {
            key: DEFAULT_CART_KEY.to_string(),
            origin: TabId::new(),
        };
        assert!(!cart.handle_storage_event(&own));
        assert!(!cart.handle_storage_event(&other_key));
        assert!(cart.handle_storage_event(&foreign));
    }
}
