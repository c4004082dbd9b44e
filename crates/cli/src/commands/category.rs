//! Category page commands.
//!
//! `apply` behaves like editing quantities on a category page: each given
//! variant gets exactly that quantity, 0 removes it, and variants not named
//! keep what they had.

use std::collections::HashMap;

use tracing::info;
use yotech_quote::QuoteContext;
use yotech_quote::error::{QuoteError, Result};
use yotech_quote::selection::{self, CategorySelection};
use yotech_quote_core::LineItemId;

use super::report;

/// Parse `<id>=<quantity>`. The id may itself contain `=`.
fn parse_quantity(pair: &str) -> Result<(LineItemId, u32)> {
    let (id, quantity) = pair
        .rsplit_once('=')
        .ok_or_else(|| QuoteError::BadInput(format!("expected <id>=<quantity>, got {pair:?}")))?;
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|e| QuoteError::BadInput(format!("{pair:?}: {e}")))?;
    Ok((LineItemId::new(id.trim()), quantity))
}

/// Print the cached quantities of a category.
///
/// # Errors
///
/// Returns an error if no category has this slug.
#[allow(clippy::print_stdout)]
pub fn show(ctx: &QuoteContext, slug: &str) -> Result<()> {
    ctx.catalog().find_by_slug(slug)?;
    let selection = CategorySelection::read(ctx.store().as_ref(), slug);
    if selection.is_empty() {
        println!("Nothing selected in {slug}");
    }
    for (id, quantity) in selection.iter() {
        println!("{id}={quantity}");
    }
    Ok(())
}

/// Apply `<id>=<quantity>` pairs to a category.
///
/// # Errors
///
/// Returns an error if the category is unknown, a pair cannot be parsed, or
/// an id does not belong to the category.
pub fn apply(ctx: &QuoteContext, slug: &str, pairs: &[String]) -> Result<()> {
    let rows = ctx.catalog().find_by_slug(slug)?.flatten();
    let mut cart = ctx.open_cart();

    let mut quantities: HashMap<LineItemId, u32> = CategorySelection::derive(&cart, &rows)
        .iter()
        .map(|(id, quantity)| (id.clone(), quantity))
        .collect();
    for pair in pairs {
        let (id, quantity) = parse_quantity(pair)?;
        if !rows.iter().any(|row| row.line_item_id() == id) {
            return Err(QuoteError::NotFound(format!("{id} in {slug}")));
        }
        quantities.insert(id, quantity);
    }

    let selection = selection::apply_category_quantities(&mut cart, slug, &rows, &quantities);
    info!(
        slug,
        selected = selection.len(),
        total = %cart.total_price(),
        "Category quantities applied"
    );
    report(&cart);
    Ok(())
}

/// Remove every variant of a category from the cart.
///
/// # Errors
///
/// Returns an error if no category has this slug.
pub fn clear(ctx: &QuoteContext, slug: &str) -> Result<()> {
    let rows = ctx.catalog().find_by_slug(slug)?.flatten();
    let mut cart = ctx.open_cart();
    selection::clear_category(&mut cart, slug, &rows);

    info!(slug, total = %cart.total_price(), "Category cleared");
    report(&cart);
    Ok(())
}
