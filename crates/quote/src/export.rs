//! Quote export.
//!
//! CSV is the only format produced here. It opens cleanly in spreadsheet
//! apps thanks to the UTF-8 byte order mark, and ends with a total row.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, instrument};
use yotech_quote_core::{LineItem, Price};

use crate::view::{category_of, core_of, finish_of, subcategory_of};

/// UTF-8 byte order mark.
const BOM: char = '\u{FEFF}';

const HEADERS: [&str; 9] = [
    "Danh mục",
    "Đầu mục",
    "Tên cốt",
    "Tên phủ",
    "Đơn vị",
    "Đơn giá",
    "Số lượng",
    "Thành tiền",
    "Ghi chú",
];

const TOTAL_LABEL: &str = "TỔNG CỘNG";

/// Errors that can occur exporting a quote.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is nothing to export.
    #[error("no items to export")]
    Empty,

    /// Writing the export file failed.
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Quote a text cell, doubling embedded quotes.
fn text_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render rows plus a total line as CSV.
///
/// `total` is passed in rather than recomputed so that a filtered view
/// exports its own filtered total.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] if `items` is empty.
pub fn to_csv(items: &[&LineItem], total: Price) -> Result<String, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(HEADERS.join(","));
    for item in items {
        let line_total = item.line_total().unwrap_or(Price::MAX);
        lines.push(
            [
                text_cell(category_of(item)),
                text_cell(subcategory_of(item)),
                text_cell(core_of(item)),
                text_cell(finish_of(item)),
                text_cell(&item.unit),
                item.unit_price.amount().to_string(),
                item.quantity.to_string(),
                line_total.amount().to_string(),
                text_cell(item.note.as_deref().unwrap_or_default()),
            ]
            .join(","),
        );
    }
    lines.push(format!(
        "\"\",\"\",\"\",\"\",\"\",\"\",\"{TOTAL_LABEL}\",{},\"\"",
        total.amount()
    ));

    let mut csv = String::new();
    csv.push(BOM);
    csv.push_str(&lines.join("\n"));
    Ok(csv)
}

/// `bao-gia-YYYY-MM-DD-HH-MM-SS.<ext>`
#[must_use]
pub fn export_file_name(at: NaiveDateTime, extension: &str) -> String {
    format!("bao-gia-{}.{extension}", at.format("%Y-%m-%d-%H-%M-%S"))
}

/// Write a CSV export into `dir` and return its path.
///
/// # Errors
///
/// Returns an error if there is nothing to export or the file cannot be
/// written.
#[instrument(skip(items), fields(items = items.len()))]
pub fn write_csv(
    dir: &Path,
    at: NaiveDateTime,
    items: &[&LineItem],
    total: Price,
) -> Result<PathBuf, ExportError> {
    let csv = to_csv(items, total)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(at, "csv"));
    fs::write(&path, csv)?;
    info!(path = %path.display(), "Quote exported");
    Ok(path)
}
