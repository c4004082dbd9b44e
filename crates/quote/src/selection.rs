//! Per-category cached quantities.
//!
//! A category page shows a quantity next to every variant of that category.
//! Those quantities are also written to `category-{slug}-quantities` as a
//! JSON object keyed by line item id, which older pages read on load.
//!
//! The cart is the source of truth. The cached map is always rebuilt from the
//! cart ([`CategorySelection::derive`]) and written back after every change,
//! never edited on its own, so the two cannot disagree.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use yotech_quote_core::LineItemId;

use crate::cart::QuoteCart;
use crate::catalog::CatalogRow;
use crate::storage::{KeyValueStore, StorageError, TabId};

/// Slot holding the cached quantities of one category.
#[must_use]
pub fn selection_key(slug: &str) -> String {
    format!("category-{slug}-quantities")
}

/// Quantities of one category's variants, keyed by line item id. Only
/// non-zero quantities are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySelection(BTreeMap<LineItemId, u32>);

impl CategorySelection {
    /// Quantities the cart currently holds for `rows`.
    #[must_use]
    pub fn derive(cart: &QuoteCart, rows: &[CatalogRow]) -> Self {
        Self(
            rows.iter()
                .filter_map(|row| {
                    let id = row.line_item_id();
                    let quantity = cart.get(id.as_str())?.quantity;
                    (quantity > 0).then_some((id, quantity))
                })
                .collect(),
        )
    }

    /// Quantity for a variant, 0 if not selected.
    #[must_use]
    pub fn quantity(&self, id: &str) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Number of selected variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected ids and quantities in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&LineItemId, u32)> + '_ {
        self.0.iter().map(|(id, q)| (id, *q))
    }

    /// Best-effort read of the cached map. Missing or unreadable slots give
    /// an empty selection.
    #[must_use]
    pub fn read(store: &dyn KeyValueStore, slug: &str) -> Self {
        let key = selection_key(slug);
        match store.get(&key) {
            Ok(Some(raw)) => serde_json::from_str::<Self>(&raw)
                .map(|mut selection| {
                    selection.0.retain(|_, q| *q > 0);
                    selection
                })
                .unwrap_or_else(|e| {
                    warn!(key, error = %e, "Ignoring unreadable category selection");
                    Self::default()
                }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(key, error = %e, "Could not read category selection");
                Self::default()
            }
        }
    }

    /// Write the map, or remove the slot when nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be encoded or the store rejects
    /// the write.
    pub fn write(
        &self,
        store: &dyn KeyValueStore,
        tab: TabId,
        slug: &str,
    ) -> Result<(), StorageError> {
        let key = selection_key(slug);
        if self.is_empty() {
            return store.remove(&key, tab);
        }
        let raw = serde_json::to_string(self)?;
        store.set(&key, &raw, tab)
    }
}

/// Apply a category page's quantities to the cart, then refresh the cache.
///
/// Every row with a positive quantity is set in the cart (replace contract:
/// the page shows the total for that variant, not an amount to add). Every
/// row at zero is removed if present. Rows missing from `quantities` count as
/// zero. Returns the refreshed selection.
pub fn apply_category_quantities<S: std::hash::BuildHasher>(
    cart: &mut QuoteCart,
    slug: &str,
    rows: &[CatalogRow],
    quantities: &HashMap<LineItemId, u32, S>,
) -> CategorySelection {
    for row in rows {
        let id = row.line_item_id();
        let quantity = quantities.get(&id).copied().unwrap_or(0);
        if quantity == 0 {
            cart.remove(id.as_str());
            continue;
        }
        if cart.get(id.as_str()).is_some_and(|item| item.quantity == quantity) {
            continue;
        }
        match row.to_line_item(quantity) {
            Ok(item) => cart.add_or_replace(item),
            Err(e) => warn!(id = %id, error = %e, "Skipping catalog row"),
        }
    }
    refresh(cart, slug, rows)
}

/// Remove every variant of a category from the cart and drop its cache slot.
pub fn clear_category(cart: &mut QuoteCart, slug: &str, rows: &[CatalogRow]) {
    for row in rows {
        cart.remove(row.line_item_id().as_str());
    }
    debug!(slug, "Cleared category selection");
    refresh(cart, slug, rows);
}

/// Rebuild the cached selection from the cart and store it.
pub fn refresh(cart: &QuoteCart, slug: &str, rows: &[CatalogRow]) -> CategorySelection {
    let selection = CategorySelection::derive(cart, rows);
    if let Err(e) = selection.write(cart.store().as_ref(), cart.tab(), slug) {
        warn!(slug, error = %e, "Could not save category selection");
    }
    selection
}
