//! Integration tests for Yotech Quote.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p yotech-quote-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Carts written to and read back from a `FileStore`
//! - `cross_tab_sync` - Several carts sharing one store
//! - `category_selection` - Category page quantities and their cache
//!
//! Shared fixtures live here so each test file builds the same catalog and
//! the same kind of store.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;

use yotech_quote::QuoteContext;
use yotech_quote::catalog::Catalog;
use yotech_quote::config::QuoteConfig;
use yotech_quote::storage::{FileStore, MemoryStore};
use yotech_quote_core::{LineItem, Price};

/// Two categories: "Tủ bếp" (slug `Tu-bep`, two finishes) and "Phòng ngủ"
/// (slug `Phong-ngu`, one finish, numeric product id).
pub const CATALOG_JSON: &str = r#"[
    {
        "Danh mục": "Tủ bếp",
        "Sản phẩm": [
            {
                "id": "TB01",
                "Đầu mục": "Tủ bếp dưới",
                "Mặc định đơn vị": "m dài",
                "Chất liệu cốt": [
                    {
                        "Tên cốt": "MDF chống ẩm",
                        "Chất liệu phủ": [
                            {
                                "Tên phủ": "Melamine",
                                "Đơn vị": "m dài",
                                "Đơn giá gốc": 2000000,
                                "Lợi nhuận (%)": 25,
                                "Giá báo khách": 2500000
                            },
                            {
                                "Tên phủ": "Acrylic",
                                "Đơn vị": "m dài",
                                "Đơn giá gốc": 3000000,
                                "Lợi nhuận (%)": 30,
                                "Giá báo khách": 3900000
                            }
                        ]
                    }
                ]
            }
        ]
    },
    {
        "Danh mục": "Phòng ngủ",
        "Sản phẩm": [
            {
                "id": 7,
                "Đầu mục": "Giường",
                "Mặc định đơn vị": "bộ",
                "Chất liệu cốt": [
                    {
                        "Tên cốt": "Gỗ sồi",
                        "Chất liệu phủ": [
                            {
                                "Tên phủ": "Sơn PU",
                                "Đơn vị": "bộ",
                                "Đơn giá gốc": 9000000,
                                "Lợi nhuận (%)": 20,
                                "Giá báo khách": 10800000
                            }
                        ]
                    }
                ]
            }
        ]
    }
]"#;

/// Line item ids of the fixture catalog.
pub mod ids {
    pub const MELAMINE: &str = "TB01-MDF chống ẩm-Melamine";
    pub const ACRYLIC: &str = "TB01-MDF chống ẩm-Acrylic";
    pub const BED: &str = "7-Gỗ sồi-Sơn PU";
}

/// The fixture catalog.
///
/// # Panics
///
/// Panics if [`CATALOG_JSON`] no longer parses.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn catalog() -> Catalog {
    Catalog::from_json_str(CATALOG_JSON).unwrap()
}

/// Context over a `FileStore` rooted at `dir`.
///
/// # Panics
///
/// Panics if the store directory cannot be created.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn file_context(dir: &Path) -> QuoteContext {
    let config = QuoteConfig {
        storage_dir: dir.to_path_buf(),
        export_dir: dir.join("exports"),
        ..QuoteConfig::default()
    };
    let store = FileStore::open(dir).unwrap();
    QuoteContext::new(config, Arc::new(store), catalog())
}

/// Context over a fresh `MemoryStore`, returned alongside the store handle.
#[must_use]
pub fn memory_context() -> (QuoteContext, MemoryStore) {
    let store = MemoryStore::new();
    let ctx = QuoteContext::new(QuoteConfig::default(), Arc::new(store.clone()), catalog());
    (ctx, store)
}

/// A bare line item priced in whole dong.
///
/// # Panics
///
/// Panics on a negative price or a blank id.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn item(id: &str, price: i64, quantity: u32) -> LineItem {
    LineItem::builder(id, Price::from_major(price).unwrap())
        .name(id)
        .unit("cái")
        .quantity(quantity)
        .build()
        .unwrap()
}

/// Whole-dong price.
///
/// # Panics
///
/// Panics on a negative amount.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn vnd(amount: i64) -> Price {
    Price::from_major(amount).unwrap()
}
