//! Integration tests for cart persistence through the file store.
//!
//! Each test opens a context on a temporary directory, mutates a cart, and
//! then opens a second context on the same directory, as a restart would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use pretty_assertions::assert_eq;
use yotech_quote::SaveStatus;
use yotech_quote::storage::{FileStore, KeyValueStore, TabId};
use yotech_quote_integration_tests::{file_context, ids, item, vnd};

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = file_context(dir.path()).open_cart();
    cart.add_or_replace(item("b", 50_000, 2));
    cart.add_or_replace(item("a", 100_000, 1));
    cart.increment_by(item("b", 50_000, 3));
    assert_eq!(cart.save_status(), &SaveStatus::Saved);

    let reopened = file_context(dir.path()).open_cart();
    let order: Vec<_> = reopened
        .items()
        .map(|i| (i.id.to_string(), i.quantity))
        .collect();
    assert_eq!(order, vec![("b".to_string(), 5), ("a".to_string(), 1)]);
    assert_eq!(reopened.total_price(), vnd(350_000));
}

#[test]
fn test_catalog_item_keeps_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = file_context(dir.path());
    let row = ctx
        .catalog()
        .find_variant("Tu-bep", "TB01", "MDF chống ẩm", "Melamine")
        .unwrap();

    let mut cart = ctx.open_cart();
    cart.add_or_replace(row.to_line_item(2).unwrap());

    let reopened = file_context(dir.path()).open_cart();
    let stored = reopened.get(ids::MELAMINE).unwrap();
    assert_eq!(stored.category.as_deref(), Some("Tủ bếp"));
    assert_eq!(stored.finish.as_deref(), Some("Melamine"));
    assert_eq!(stored.product_id.as_deref(), Some("TB01"));
    assert_eq!(reopened.total_price(), vnd(5_000_000));
}

#[test]
fn test_clear_persists_empty_cart() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = file_context(dir.path()).open_cart();
    cart.add_or_replace(item("a", 1, 1));
    cart.clear();

    let reopened = file_context(dir.path()).open_cart();
    assert!(reopened.is_empty());
    assert_eq!(reopened.total_price(), vnd(0));
}

// =============================================================================
// Payloads Written by Older Versions
// =============================================================================

#[test]
fn test_legacy_array_payload_loads() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store
        .set(
            "quoteItems",
            r#"[
                {"id":"TB01-MDF-Melamine","name":"Tủ bếp","unit":"m dài","price":2500000,"quantity":2,"cover":"Melamine"},
                {"id":"x","name":"Bỏ","unit":"cái","price":1,"quantity":0}
            ]"#,
            TabId::new(),
        )
        .unwrap();

    let cart = file_context(dir.path()).open_cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(
        cart.get("TB01-MDF-Melamine").unwrap().finish.as_deref(),
        Some("Melamine")
    );
    assert_eq!(cart.total_price(), vnd(5_000_000));
}

#[test]
fn test_legacy_numeric_product_id_keeps_other_items() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let raw = r#"[
        {"id":"TB01-MDF chống ẩm-Melamine","name":"Tủ bếp","unit":"m dài","price":2500000,"quantity":2,"productId":"TB01"},
        {"id":"7-Gỗ sồi-Sơn PU","name":"Giường","unit":"bộ","price":10800000,"quantity":1,"productId":7},
        {"id":"broken","name":"Hỏng","unit":"bộ","price":"abc","quantity":1}
    ]"#;
    store.set("quoteItems", raw, TabId::new()).unwrap();

    let cart = file_context(dir.path()).open_cart();
    let order: Vec<_> = cart.items().map(|i| i.id.to_string()).collect();
    assert_eq!(order, vec![ids::MELAMINE.to_string(), ids::BED.to_string()]);
    assert_eq!(cart.get(ids::BED).unwrap().product_id.as_deref(), Some("7"));
    assert_eq!(cart.total_price(), vnd(15_800_000));
    assert_eq!(store.get("quoteItems").unwrap().as_deref(), Some(raw));
}

#[test]
fn test_corrupt_payload_is_reset_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("quoteItems", "{not json", TabId::new()).unwrap();

    let cart = file_context(dir.path()).open_cart();
    assert!(cart.is_empty());
    assert_eq!(store.get("quoteItems").unwrap(), None);
    assert!(!store.slot_path("quoteItems").unwrap().exists());
}

#[test]
fn test_future_version_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store
        .set("quoteItems", r#"{"version":2,"items":[]}"#, TabId::new())
        .unwrap();

    assert!(file_context(dir.path()).open_cart().is_empty());
    assert_eq!(store.get("quoteItems").unwrap(), None);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_filtered_view() {
    use chrono::NaiveDate;
    use yotech_quote::export;
    use yotech_quote::view::{QuoteFilter, QuoteView};

    let dir = tempfile::tempdir().unwrap();
    let ctx = file_context(dir.path());
    let mut cart = ctx.open_cart();
    for (slug, product, core, finish, quantity) in [
        ("Tu-bep", "TB01", "MDF chống ẩm", "Melamine", 2),
        ("Phong-ngu", "7", "Gỗ sồi", "Sơn PU", 1),
    ] {
        let row = ctx
            .catalog()
            .find_variant(slug, product, core, finish)
            .unwrap();
        cart.add_or_replace(row.to_line_item(quantity).unwrap());
    }

    let filter = QuoteFilter {
        category: Some("Phòng ngủ".to_string()),
        ..QuoteFilter::default()
    };
    let view = QuoteView::build(&cart, &filter, None);
    let path = export::write_csv(
        &ctx.config().export_dir,
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        &view.rows,
        view.filtered_total,
    )
    .unwrap();

    assert!(path.ends_with("bao-gia-2024-06-01-09-30-00.csv"));
    let csv = std::fs::read_to_string(path).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("\"Phòng ngủ\",\"Giường\",\"Gỗ sồi\",\"Sơn PU\""));
    assert!(lines[2].ends_with("\"TỔNG CỘNG\",10800000,\"\""));
}
