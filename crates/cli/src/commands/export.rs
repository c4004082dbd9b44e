//! Export commands.

use chrono::Local;
use yotech_quote::QuoteContext;
use yotech_quote::error::Result;
use yotech_quote::export;
use yotech_quote::view::{QuoteFilter, QuoteSort, QuoteView};

/// Write the visible rows to a CSV file in the export directory.
///
/// # Errors
///
/// Returns an error if nothing matches or the file cannot be written.
#[allow(clippy::print_stdout)]
pub fn csv(ctx: &QuoteContext, filter: &QuoteFilter, sort: Option<QuoteSort>) -> Result<()> {
    let cart = ctx.open_cart();
    let view = QuoteView::build(&cart, filter, sort);
    let path = export::write_csv(
        &ctx.config().export_dir,
        Local::now().naive_local(),
        &view.rows,
        view.filtered_total,
    )?;
    println!("{}", path.display());
    Ok(())
}
