//! Read-only product catalog.
//!
//! The catalog is a static JSON document: a list of categories, each with
//! products, each with core-material variants, each with finish variants that
//! carry the unit and prices. Field names are the Vietnamese column names of
//! the source spreadsheet.
//!
//! The quote core only reads what it needs to build a [`LineItem`]. Nothing
//! here mutates catalog data.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use yotech_quote_core::{
    LineItem, LineItemError, LineItemId, Price, search_key, slugify, string_or_number,
};

/// Errors that can occur loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The catalog is not valid JSON or has the wrong shape.
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// No category has this slug.
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// The category has no such product / core / finish combination.
    #[error("variant not found in {category}: {product_id} / {core} / {finish}")]
    VariantNotFound {
        category: String,
        product_id: String,
        core: String,
        finish: String,
    },
}

/// Finish (surface cover) variant of a core material.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Finish {
    #[serde(rename = "Tên phủ")]
    pub name: String,
    #[serde(rename = "Đơn vị", default)]
    pub unit: String,
    /// Cost before margin.
    #[serde(rename = "Đơn giá gốc", default)]
    pub base_cost: Price,
    #[serde(rename = "Lợi nhuận (%)", default)]
    pub margin_percent: Decimal,
    /// Price quoted to the customer.
    #[serde(rename = "Giá báo khách", default)]
    pub list_price: Price,
    #[serde(rename = "Ghi chú", default)]
    pub note: Option<String>,
}

/// Core material (substrate) of a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoreMaterial {
    #[serde(rename = "Tên cốt")]
    pub name: String,
    #[serde(rename = "Chất liệu phủ", default)]
    pub finishes: Vec<Finish>,
}

/// A catalog product (a subcategory line such as "Tủ bếp dưới").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    /// Strings in newer exports, numbers in older ones.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "Đầu mục")]
    pub subcategory: String,
    #[serde(rename = "Mặc định đơn vị", default)]
    pub default_unit: String,
    #[serde(rename = "Chất liệu cốt", default)]
    pub cores: Vec<CoreMaterial>,
    #[serde(rename = "Ngày tạo", default)]
    pub created_at: Option<String>,
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(rename = "Danh mục")]
    pub name: String,
    #[serde(rename = "Sản phẩm", default)]
    pub products: Vec<Product>,
}

impl Category {
    /// URL slug of this category.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// One row per product × core material × finish, in catalog order.
    #[must_use]
    pub fn flatten(&self) -> Vec<CatalogRow> {
        self.products
            .iter()
            .flat_map(move |product| {
                product.cores.iter().flat_map(move |core| {
                    core.finishes.iter().map(move |finish| CatalogRow {
                        category: self.name.clone(),
                        product_id: product.id.clone(),
                        subcategory: product.subcategory.clone(),
                        core: core.name.clone(),
                        finish: finish.name.clone(),
                        unit: finish.unit.clone(),
                        list_price: finish.list_price,
                        base_cost: finish.base_cost,
                        margin_percent: finish.margin_percent,
                        note: finish.note.clone().unwrap_or_default(),
                        default_unit: product.default_unit.clone(),
                        created_at: product.created_at.clone(),
                    })
                })
            })
            .collect()
    }
}

/// One selectable variant, flattened out of the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub category: String,
    pub product_id: String,
    pub subcategory: String,
    pub core: String,
    pub finish: String,
    pub unit: String,
    pub list_price: Price,
    pub base_cost: Price,
    pub margin_percent: Decimal,
    pub note: String,
    pub default_unit: String,
    pub created_at: Option<String>,
}

impl CatalogRow {
    /// Cart key of this variant.
    #[must_use]
    pub fn line_item_id(&self) -> LineItemId {
        LineItemId::compose(&self.product_id, &self.core, &self.finish)
    }

    /// Build a cart line for `quantity` units of this variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the row has no usable id.
    pub fn to_line_item(&self, quantity: u32) -> Result<LineItem, LineItemError> {
        let mut builder = LineItem::builder(self.line_item_id(), self.list_price)
            .name(format!(
                "{} - {} - {} - {}",
                self.category, self.subcategory, self.core, self.finish
            ))
            .unit(&self.unit)
            .quantity(quantity)
            .category(&self.category)
            .subcategory(&self.subcategory)
            .core(&self.core)
            .finish(&self.finish)
            .base_cost(self.base_cost)
            .margin_percent(self.margin_percent)
            .note(&self.note)
            .product_id(&self.product_id)
            .default_unit(&self.default_unit);
        if let Some(created_at) = &self.created_at {
            builder = builder.created_at(created_at);
        }
        builder.build()
    }

    /// Tone- and case-insensitive match on subcategory, core, finish, or note.
    /// An empty term matches everything.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = search_key(term.trim());
        term.is_empty()
            || [&self.subcategory, &self.core, &self.finish, &self.note]
                .iter()
                .any(|field| search_key(field).contains(&term))
    }
}

/// The whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Wrap already parsed categories.
    #[must_use]
    pub const fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the JSON is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        debug!(categories = catalog.categories.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// All categories in catalog order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Distinct category names in catalog order.
    #[must_use]
    pub fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            if !names.contains(&category.name.as_str()) {
                names.push(&category.name);
            }
        }
        names
    }

    /// Category whose slug equals `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CategoryNotFound`] if none matches.
    pub fn find_by_slug(&self, slug: &str) -> Result<&Category, CatalogError> {
        self.categories
            .iter()
            .find(|category| category.slug() == slug)
            .ok_or_else(|| CatalogError::CategoryNotFound(slug.to_owned()))
    }

    /// The row for one product / core / finish in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category or the variant does not exist.
    pub fn find_variant(
        &self,
        slug: &str,
        product_id: &str,
        core: &str,
        finish: &str,
    ) -> Result<CatalogRow, CatalogError> {
        let category = self.find_by_slug(slug)?;
        category
            .flatten()
            .into_iter()
            .find(|row| row.product_id == product_id && row.core == core && row.finish == finish)
            .ok_or_else(|| CatalogError::VariantNotFound {
                category: category.name.clone(),
                product_id: product_id.to_owned(),
                core: core.to_owned(),
                finish: finish.to_owned(),
            })
    }
}
