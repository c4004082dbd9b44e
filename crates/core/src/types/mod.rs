//! Core types for Yotech Quote.
//!
//! This module provides type-safe wrappers for the quoting domain.

pub mod id;
pub mod lenient;
pub mod line_item;
pub mod price;
pub mod slug;

pub use id::LineItemId;
pub use lenient::{optional_string_or_number, string_or_number};
pub use line_item::{LineItem, LineItemBuilder, LineItemError};
pub use price::{Price, PriceError};
pub use slug::{search_key, slugify, strip_tones};
