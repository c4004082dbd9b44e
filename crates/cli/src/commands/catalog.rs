//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! quote-cli catalog categories
//! quote-cli catalog rows Tu-bep --search "chong am"
//! ```

use yotech_quote::QuoteContext;
use yotech_quote::error::Result;
use yotech_quote::selection::CategorySelection;

/// Print every category as `<slug>  <name>  (<rows> rows)`.
#[allow(clippy::print_stdout)]
pub fn categories(ctx: &QuoteContext) {
    for category in ctx.catalog().categories() {
        println!(
            "{:<28} {}  ({} rows)",
            category.slug(),
            category.name,
            category.flatten().len()
        );
    }
}

/// Print the rows of one category with the quantity already selected.
///
/// # Errors
///
/// Returns an error if no category has this slug.
#[allow(clippy::print_stdout)]
pub fn rows(ctx: &QuoteContext, slug: &str, search: Option<&str>) -> Result<()> {
    let category = ctx.catalog().find_by_slug(slug)?;
    let selection = CategorySelection::read(ctx.store().as_ref(), slug);

    for row in category
        .flatten()
        .iter()
        .filter(|row| row.matches_search(search.unwrap_or_default()))
    {
        let id = row.line_item_id();
        println!(
            "{id}\t{} / {} / {}\t{} per {}\tx{}",
            row.subcategory,
            row.core,
            row.finish,
            row.list_price,
            row.unit,
            selection.quantity(id.as_str())
        );
    }
    Ok(())
}
