//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! quote-cli cart show --sort total --desc
//! quote-cli cart add Tu-bep TB01 "MDF chống ẩm" Melamine 2
//! quote-cli cart increment Tu-bep TB01 "MDF chống ẩm" Melamine 1
//! quote-cli cart set "TB01-MDF chống ẩm-Melamine" 5
//! quote-cli cart remove "TB01-MDF chống ẩm-Melamine"
//! quote-cli cart clear
//! ```

use tracing::info;
use yotech_quote::QuoteContext;
use yotech_quote::error::{QuoteError, Result};
use yotech_quote::selection;
use yotech_quote::view::{QuoteFilter, QuoteSort, QuoteView};
use yotech_quote_core::Price;

use super::{refresh_owning_category, report};

/// One catalog variant and a quantity.
pub struct Variant {
    pub slug: String,
    pub product: String,
    pub core: String,
    pub finish: String,
    pub quantity: u32,
}

/// Print the cart as a table followed by the (filtered) total.
#[allow(clippy::print_stdout)]
pub fn show(ctx: &QuoteContext, filter: &QuoteFilter, sort: Option<QuoteSort>) {
    let cart = ctx.open_cart();
    let view = QuoteView::build(&cart, filter, sort);

    for item in &view.rows {
        println!(
            "{}\t{}\t{} {} x {} = {}",
            item.id,
            item.name,
            item.quantity,
            item.unit,
            item.unit_price,
            item.line_total().unwrap_or(Price::MAX)
        );
    }
    println!(
        "{} of {} lines, {} units, total {}",
        view.rows.len(),
        cart.len(),
        cart.total_quantity(),
        view.filtered_total
    );
    report(&cart);
}

/// Put a catalog variant in the cart. With `additive` the quantity is added
/// to what is already there, otherwise it replaces it.
///
/// # Errors
///
/// Returns an error if the variant is not in the catalog or its price is
/// unusable.
pub fn add(ctx: &QuoteContext, variant: &Variant, additive: bool) -> Result<()> {
    let category = ctx.catalog().find_by_slug(&variant.slug)?;
    let row = ctx.catalog().find_variant(
        &variant.slug,
        &variant.product,
        &variant.core,
        &variant.finish,
    )?;
    let item = row.to_line_item(variant.quantity)?;
    let id = item.id.clone();

    let mut cart = ctx.open_cart();
    if additive {
        cart.increment_by(item);
    } else {
        cart.add_or_replace(item);
    }
    selection::refresh(&cart, &variant.slug, &category.flatten());

    info!(
        id = %id,
        quantity = cart.get(id.as_str()).map_or(0, |item| item.quantity),
        total = %cart.total_price(),
        "Cart updated"
    );
    report(&cart);
    Ok(())
}

/// Set the quantity of an existing line. `quantity <= 0` removes it.
///
/// # Errors
///
/// Returns [`QuoteError::NotFound`] if the cart has no such line.
pub fn set(ctx: &QuoteContext, id: &str, quantity: i64) -> Result<()> {
    let mut cart = ctx.open_cart();
    if !cart.contains(id) {
        return Err(QuoteError::NotFound(id.to_owned()));
    }
    cart.update_quantity(id, quantity);
    refresh_owning_category(ctx, &cart, id);

    info!(id, quantity, total = %cart.total_price(), "Quantity updated");
    report(&cart);
    Ok(())
}

/// Remove a line. Removing a missing line is not an error.
pub fn remove(ctx: &QuoteContext, id: &str) {
    let mut cart = ctx.open_cart();
    if !cart.contains(id) {
        info!(id, "Nothing to remove");
        return;
    }
    cart.remove(id);
    refresh_owning_category(ctx, &cart, id);

    info!(id, total = %cart.total_price(), "Line removed");
    report(&cart);
}

/// Empty the cart and every category cache.
pub fn clear(ctx: &QuoteContext) {
    let mut cart = ctx.open_cart();
    cart.clear();
    for category in ctx.catalog().categories() {
        selection::refresh(&cart, &category.slug(), &category.flatten());
    }

    info!("Cart cleared");
    report(&cart);
}
