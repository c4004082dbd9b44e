//! Unified error handling.
//!
//! The cart never returns errors (storage failures surface as
//! [`SaveStatus`](crate::cart::SaveStatus)). Everything around it, from
//! loading the catalog to writing an export, reports through [`QuoteError`].

use thiserror::Error;
use yotech_quote_core::LineItemError;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::storage::StorageError;

/// Application-level error type for quote operations.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog could not be loaded or queried.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A line item could not be built.
    #[error("Line item error: {0}")]
    LineItem(#[from] LineItemError),

    /// Export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// No cart item with this id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller input could not be understood.
    #[error("Bad input: {0}")]
    BadInput(String),
}

/// Result alias for quote operations.
pub type Result<T, E = QuoteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_error_display() {
        let err = QuoteError::NotFound("TB01-MDF-Melamine".to_string());
        assert_eq!(err.to_string(), "Not found: TB01-MDF-Melamine");

        let err = QuoteError::BadInput("qty=abc".to_string());
        assert_eq!(err.to_string(), "Bad input: qty=abc");
    }

    #[test]
    fn test_quote_error_from() {
        let err: QuoteError = ExportError::Empty.into();
        assert!(matches!(err, QuoteError::Export(ExportError::Empty)));
        assert_eq!(err.to_string(), "Export error: no items to export");

        let err: QuoteError = StorageError::Unavailable.into();
        assert!(matches!(err, QuoteError::Storage(StorageError::Unavailable)));

        let err: QuoteError =
            ConfigError::InvalidEnvVar("QUOTE_STORAGE_KEY".into(), "must not be empty".into())
                .into();
        assert_eq!(
            err.to_string(),
            "Config error: Invalid environment variable QUOTE_STORAGE_KEY: must not be empty"
        );
    }
}
