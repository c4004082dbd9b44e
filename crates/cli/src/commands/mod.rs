//! Command implementations.

pub mod cart;
pub mod catalog;
pub mod category;
pub mod export;

use tracing::warn;
use yotech_quote::selection;
use yotech_quote::{QuoteCart, QuoteContext, SaveStatus};

/// Warn when the last write did not reach storage.
fn report(cart: &QuoteCart) {
    if let SaveStatus::MemoryOnly { reason } = cart.save_status() {
        warn!(reason, "Quote could not be saved, changes were not kept");
    }
}

/// Rebuild the cached quantities of the category that sells `id`, if any.
fn refresh_owning_category(ctx: &QuoteContext, cart: &QuoteCart, id: &str) {
    for category in ctx.catalog().categories() {
        let rows = category.flatten();
        if rows.iter().any(|row| row.line_item_id().as_str() == id) {
            selection::refresh(cart, &category.slug(), &rows);
            return;
        }
    }
}
