//! One quoted product variant.

use serde::{Deserialize, Serialize};

use super::id::LineItemId;
use super::price::{Price, PriceError};

/// Errors that can occur when building a [`LineItem`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The id is empty.
    #[error("line item id cannot be empty")]
    EmptyId,
}

/// One selected product variant in a quote.
///
/// Only `id`, `unit_price`, and `quantity` take part in any computation. The
/// rest is carried through for display and export.
///
/// Field names on the wire match the payload the browser app stored under
/// `quoteItems`, so old carts still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    /// Display label, usually `category - subcategory - core - finish`.
    pub name: String,
    /// Unit of measure, e.g. `m²` or `bộ`.
    pub unit: String,
    /// Price per unit at the time of selection.
    #[serde(rename = "price")]
    pub unit_price: Price,
    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Core material name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core: Option<String>,
    /// Finish (surface cover) name.
    #[serde(default, rename = "cover", skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    #[serde(default, rename = "basePrice", skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<Price>,
    #[serde(default, rename = "profit", skip_serializing_if = "Option::is_none")]
    pub margin_percent: Option<rust_decimal::Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::lenient::optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<String>,
    #[serde(default, rename = "unit_default", skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,
    #[serde(default, rename = "created_date", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl LineItem {
    /// Start building a line item.
    #[must_use]
    pub fn builder(id: impl Into<LineItemId>, unit_price: Price) -> LineItemBuilder {
        LineItemBuilder::new(id.into(), unit_price)
    }

    /// `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product leaves the decimal range.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.unit_price.times(self.quantity)
    }

    /// A zero quantity item is logically absent and must not be stored.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.quantity > 0
    }
}

/// Builder for [`LineItem`].
#[derive(Debug, Clone)]
#[must_use]
pub struct LineItemBuilder {
    item: LineItem,
}

impl LineItemBuilder {
    fn new(id: LineItemId, unit_price: Price) -> Self {
        Self {
            item: LineItem {
                name: id.to_string(),
                id,
                unit: String::new(),
                unit_price,
                quantity: 1,
                category: None,
                subcategory: None,
                core: None,
                finish: None,
                base_cost: None,
                margin_percent: None,
                note: None,
                product_id: None,
                default_unit: None,
                created_at: None,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.item.name = name.into();
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.item.unit = unit.into();
        self
    }

    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.item.quantity = quantity;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.item.category = Some(category.into());
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.item.subcategory = Some(subcategory.into());
        self
    }

    pub fn core(mut self, core: impl Into<String>) -> Self {
        self.item.core = Some(core.into());
        self
    }

    pub fn finish(mut self, finish: impl Into<String>) -> Self {
        self.item.finish = Some(finish.into());
        self
    }

    pub const fn base_cost(mut self, base_cost: Price) -> Self {
        self.item.base_cost = Some(base_cost);
        self
    }

    pub const fn margin_percent(mut self, margin: rust_decimal::Decimal) -> Self {
        self.item.margin_percent = Some(margin);
        self
    }

    /// Empty notes are dropped.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.item.note = (!note.is_empty()).then_some(note);
        self
    }

    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.item.product_id = Some(product_id.into());
        self
    }

    pub fn default_unit(mut self, unit: impl Into<String>) -> Self {
        self.item.default_unit = Some(unit.into());
        self
    }

    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.item.created_at = Some(created_at.into());
        self
    }

    /// Finish the item.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::EmptyId`] if the id is blank.
    pub fn build(self) -> Result<LineItem, LineItemError> {
        if self.item.id.as_str().trim().is_empty() {
            return Err(LineItemError::EmptyId);
        }
        Ok(self.item)
    }
}
