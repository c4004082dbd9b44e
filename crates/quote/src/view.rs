//! Filtered, sorted read model of the cart.
//!
//! This is what the quote table and the exporters consume. Filtering and
//! sorting never touch the cart itself; the filtered total is computed over
//! the visible rows only.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use thiserror::Error;
use yotech_quote_core::{LineItem, Price, search_key};

use crate::cart::QuoteCart;

/// Label used wherever a facet is missing or blank.
pub const UNCATEGORIZED: &str = "Khác";

fn facet(value: Option<&String>) -> &str {
    value
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNCATEGORIZED)
}

/// Category facet of an item.
#[must_use]
pub fn category_of(item: &LineItem) -> &str {
    facet(item.category.as_ref())
}

/// Subcategory facet of an item.
#[must_use]
pub fn subcategory_of(item: &LineItem) -> &str {
    facet(item.subcategory.as_ref())
}

/// Core material facet of an item.
#[must_use]
pub fn core_of(item: &LineItem) -> &str {
    facet(item.core.as_ref())
}

/// Finish facet of an item.
#[must_use]
pub fn finish_of(item: &LineItem) -> &str {
    facet(item.finish.as_ref())
}

/// Which rows to show. `None` facets match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub core: Option<String>,
    pub finish: Option<String>,
    /// Tone-insensitive substring over name, unit, facets, and note.
    pub search: Option<String>,
}

impl QuoteFilter {
    /// True if `item` passes every set facet and the search term.
    #[must_use]
    pub fn matches(&self, item: &LineItem) -> bool {
        let facet_ok = |wanted: &Option<String>, actual: &str| {
            wanted.as_deref().is_none_or(|w| w == actual)
        };
        if !facet_ok(&self.category, category_of(item))
            || !facet_ok(&self.subcategory, subcategory_of(item))
            || !facet_ok(&self.core, core_of(item))
            || !facet_ok(&self.finish, finish_of(item))
        {
            return false;
        }

        let Some(term) = self.search.as_deref().map(search_key) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }
        [
            Some(item.name.as_str()),
            Some(item.unit.as_str()),
            item.category.as_deref(),
            item.subcategory.as_deref(),
            item.core.as_deref(),
            item.finish.as_deref(),
            item.note.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| search_key(field).contains(&term))
    }
}

/// Error parsing a [`SortColumn`].
#[derive(Debug, Error)]
#[error("unknown sort column: {0}")]
pub struct UnknownSortColumn(String);

/// Column to sort the quote table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Category,
    Subcategory,
    Core,
    Finish,
    Unit,
    UnitPrice,
    Quantity,
    LineTotal,
}

impl FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "name" => Self::Name,
            "category" => Self::Category,
            "subcategory" => Self::Subcategory,
            "core" => Self::Core,
            "finish" | "cover" => Self::Finish,
            "unit" => Self::Unit,
            "price" | "unit-price" => Self::UnitPrice,
            "quantity" => Self::Quantity,
            "total" | "line-total" => Self::LineTotal,
            _ => return Err(UnknownSortColumn(s.to_owned())),
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl QuoteSort {
    /// Same column toggles direction, a new column starts ascending.
    #[must_use]
    pub fn toggle(current: Option<Self>, column: SortColumn) -> Self {
        match current {
            Some(sort) if sort.column == column => Self {
                column,
                direction: match sort.direction {
                    SortDirection::Ascending => SortDirection::Descending,
                    SortDirection::Descending => SortDirection::Ascending,
                },
            },
            _ => Self {
                column,
                direction: SortDirection::Ascending,
            },
        }
    }

    fn compare(self, a: &LineItem, b: &LineItem) -> Ordering {
        let text = |x: &str, y: &str| search_key(x).cmp(&search_key(y)).then_with(|| x.cmp(y));
        let line_total = |item: &LineItem| item.line_total().unwrap_or(Price::MAX);
        let ordering = match self.column {
            SortColumn::Name => text(&a.name, &b.name),
            SortColumn::Category => text(category_of(a), category_of(b)),
            SortColumn::Subcategory => text(subcategory_of(a), subcategory_of(b)),
            SortColumn::Core => text(core_of(a), core_of(b)),
            SortColumn::Finish => text(finish_of(a), finish_of(b)),
            SortColumn::Unit => text(&a.unit, &b.unit),
            SortColumn::UnitPrice => a.unit_price.cmp(&b.unit_price),
            SortColumn::Quantity => a.quantity.cmp(&b.quantity),
            SortColumn::LineTotal => line_total(a).cmp(&line_total(b)),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Visible rows plus their total.
#[derive(Debug, Clone)]
pub struct QuoteView<'a> {
    pub rows: Vec<&'a LineItem>,
    pub filtered_total: Price,
}

impl<'a> QuoteView<'a> {
    /// Filter then (stably) sort the cart's items. Without a sort the cart's
    /// insertion order is kept.
    #[must_use]
    pub fn build(cart: &'a QuoteCart, filter: &QuoteFilter, sort: Option<QuoteSort>) -> Self {
        let mut rows: Vec<&LineItem> = cart.items().filter(|item| filter.matches(item)).collect();
        if let Some(sort) = sort {
            rows.sort_by(|a, b| sort.compare(a, b));
        }
        let filtered_total = rows
            .iter()
            .map(|item| item.line_total().unwrap_or(Price::MAX))
            .sum();
        Self {
            rows,
            filtered_total,
        }
    }
}

/// Distinct facet values present in the cart, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub categories: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
    pub cores: BTreeSet<String>,
    pub finishes: BTreeSet<String>,
}

impl Facets {
    /// Collect facet values from the cart.
    #[must_use]
    pub fn of(cart: &QuoteCart) -> Self {
        let mut facets = Self::default();
        for item in cart.items() {
            facets.categories.insert(category_of(item).to_owned());
            facets.subcategories.insert(subcategory_of(item).to_owned());
            facets.cores.insert(core_of(item).to_owned());
            facets.finishes.insert(finish_of(item).to_owned());
        }
        facets
    }
}
