//! Integration tests for category page quantities.
//!
//! The cart owns the quantities. The `category-{slug}-quantities` slot is a
//! cache rebuilt from the cart after every category page change.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};

use pretty_assertions::assert_eq;
use yotech_quote::selection::{
    self, CategorySelection, apply_category_quantities, clear_category, selection_key,
};
use yotech_quote::storage::KeyValueStore;
use yotech_quote_core::LineItemId;
use yotech_quote_integration_tests::{file_context, ids, item, memory_context, vnd};

fn quantities(pairs: &[(&str, u32)]) -> HashMap<LineItemId, u32> {
    pairs
        .iter()
        .map(|(id, q)| (LineItemId::new(*id), *q))
        .collect()
}

// =============================================================================
// Apply
// =============================================================================

#[test]
fn test_apply_writes_cart_and_cache() {
    let (ctx, store) = memory_context();
    let rows = ctx.catalog().find_by_slug("Tu-bep").unwrap().flatten();
    let mut cart = ctx.open_cart();

    apply_category_quantities(
        &mut cart,
        "Tu-bep",
        &rows,
        &quantities(&[(ids::MELAMINE, 2), (ids::ACRYLIC, 1)]),
    );

    assert_eq!(cart.total_price(), vnd(2 * 2_500_000 + 3_900_000));
    let raw = store.get(&selection_key("Tu-bep")).unwrap().unwrap();
    let cached: BTreeMap<String, u32> = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        cached,
        BTreeMap::from([(ids::ACRYLIC.to_string(), 1), (ids::MELAMINE.to_string(), 2)])
    );
}

#[test]
fn test_reapply_replaces_quantities() {
    let (ctx, _) = memory_context();
    let rows = ctx.catalog().find_by_slug("Tu-bep").unwrap().flatten();
    let mut cart = ctx.open_cart();

    apply_category_quantities(&mut cart, "Tu-bep", &rows, &quantities(&[(ids::MELAMINE, 2)]));
    apply_category_quantities(&mut cart, "Tu-bep", &rows, &quantities(&[(ids::MELAMINE, 5)]));

    assert_eq!(cart.get(ids::MELAMINE).unwrap().quantity, 5);
    assert_eq!(cart.total_price(), vnd(12_500_000));
}

#[test]
fn test_apply_keeps_other_categories() {
    let (ctx, _) = memory_context();
    let kitchen = ctx.catalog().find_by_slug("Tu-bep").unwrap().flatten();
    let bedroom = ctx.catalog().find_by_slug("Phong-ngu").unwrap().flatten();
    let mut cart = ctx.open_cart();

    apply_category_quantities(&mut cart, "Phong-ngu", &bedroom, &quantities(&[(ids::BED, 1)]));
    cart.add_or_replace(item("manual", 1_000, 1));
    apply_category_quantities(&mut cart, "Tu-bep", &kitchen, &HashMap::new());

    assert!(cart.contains(ids::BED));
    assert!(cart.contains("manual"));
    assert_eq!(cart.total_price(), vnd(10_801_000));
}

// =============================================================================
// Cache Follows the Cart
// =============================================================================

#[test]
fn test_cart_edit_is_reflected_after_refresh() {
    let (ctx, store) = memory_context();
    let rows = ctx.catalog().find_by_slug("Tu-bep").unwrap().flatten();
    let mut cart = ctx.open_cart();
    apply_category_quantities(
        &mut cart,
        "Tu-bep",
        &rows,
        &quantities(&[(ids::MELAMINE, 2), (ids::ACRYLIC, 1)]),
    );

    // Edited from the quote table instead of the category page.
    cart.update_quantity(ids::MELAMINE, 7);
    cart.remove(ids::ACRYLIC);
    let refreshed = selection::refresh(&cart, "Tu-bep", &rows);

    assert_eq!(refreshed.quantity(ids::MELAMINE), 7);
    assert_eq!(refreshed.quantity(ids::ACRYLIC), 0);
    assert_eq!(CategorySelection::read(&store, "Tu-bep"), refreshed);
}

#[test]
fn test_other_tab_sees_category_changes() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = file_context(dir.path());
    let rows = ctx.catalog().find_by_slug("Tu-bep").unwrap().flatten();
    let mut page = ctx.open_cart();
    let mut table = ctx.open_cart();

    apply_category_quantities(&mut page, "Tu-bep", &rows, &quantities(&[(ids::MELAMINE, 3)]));

    assert!(table.sync_external_changes());
    assert_eq!(table.get(ids::MELAMINE).unwrap().quantity, 3);
    assert_eq!(
        CategorySelection::derive(&table, &rows),
        CategorySelection::read(ctx.store().as_ref(), "Tu-bep")
    );
}

// =============================================================================
// Clear
// =============================================================================

#[test]
fn test_clear_category() {
    let (ctx, store) = memory_context();
    let kitchen = ctx.catalog().find_by_slug("Tu-bep").unwrap().flatten();
    let bedroom = ctx.catalog().find_by_slug("Phong-ngu").unwrap().flatten();
    let mut cart = ctx.open_cart();
    apply_category_quantities(&mut cart, "Tu-bep", &kitchen, &quantities(&[(ids::MELAMINE, 2)]));
    apply_category_quantities(&mut cart, "Phong-ngu", &bedroom, &quantities(&[(ids::BED, 1)]));

    clear_category(&mut cart, "Tu-bep", &kitchen);

    assert!(!cart.contains(ids::MELAMINE));
    assert!(cart.contains(ids::BED));
    assert_eq!(store.get(&selection_key("Tu-bep")).unwrap(), None);
    assert_eq!(CategorySelection::read(&store, "Phong-ngu").quantity(ids::BED), 1);
}
