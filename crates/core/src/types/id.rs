//! Line item identity.
//!
//! A quoted variant is identified by the product it comes from plus the core
//! material and finish the user picked. The same variant can be reached from
//! several catalog pages (category page, quick quote), and all of them must
//! land on the same cart entry.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Composite key of a quoted product variant.
///
/// The string form is `"{product_id}-{core}-{finish}"`, which is also the key
/// format used by payloads the browser app wrote before this crate existed.
///
/// # Example
///
/// ```rust
/// # use yotech_quote_core::LineItemId;
/// let id = LineItemId::compose("SP01", "MDF chống ẩm", "Melamine");
/// assert_eq!(id.as_str(), "SP01-MDF chống ẩm-Melamine");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(String);

impl LineItemId {
    /// Wrap an already composed key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Compose the key for a product / core material / finish selection.
    #[must_use]
    pub fn compose(product_id: &str, core: &str, finish: &str) -> Self {
        Self(format!("{product_id}-{core}-{finish}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for LineItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for LineItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::borrow::Borrow<str> for LineItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
