//! Quote configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `QUOTE_STORAGE_DIR` - Directory holding persisted slots (default: .quote-storage)
//! - `QUOTE_CATALOG_PATH` - Catalog JSON file (default: data/bao_gia_noi_that_grouped_danh_muc_full.json)
//! - `QUOTE_STORAGE_KEY` - Slot name of the cart (default: quoteItems)
//! - `QUOTE_EXPORT_DIR` - Where exports are written (default: .)

use std::path::PathBuf;

use thiserror::Error;

use crate::cart::DEFAULT_CART_KEY;

const DEFAULT_STORAGE_DIR: &str = ".quote-storage";
const DEFAULT_CATALOG_PATH: &str = "data/bao_gia_noi_that_grouped_danh_muc_full.json";
const DEFAULT_EXPORT_DIR: &str = ".";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Quote application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteConfig {
    /// Directory for the file-backed slot store
    pub storage_dir: PathBuf,
    /// Catalog JSON file
    pub catalog_path: PathBuf,
    /// Slot name the cart persists under
    pub storage_key: String,
    /// Directory exports are written into
    pub export_dir: PathBuf,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            storage_key: DEFAULT_CART_KEY.to_string(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}

impl QuoteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for blank paths or a blank
    /// storage key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| -> Result<String, ConfigError> {
            let value = lookup(key).unwrap_or_else(|| default.to_string());
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Ok(value)
        };

        Ok(Self {
            storage_dir: get("QUOTE_STORAGE_DIR", DEFAULT_STORAGE_DIR)?.into(),
            catalog_path: get("QUOTE_CATALOG_PATH", DEFAULT_CATALOG_PATH)?.into(),
            storage_key: get("QUOTE_STORAGE_KEY", DEFAULT_CART_KEY)?,
            export_dir: get("QUOTE_EXPORT_DIR", DEFAULT_EXPORT_DIR)?.into(),
        })
    }
}

/// Get an optional environment variable.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = QuoteConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QuoteConfig::default());
        assert_eq!(config.storage_key, "quoteItems");
    }

    #[test]
    fn test_overrides() {
        let config = QuoteConfig::from_lookup(lookup(&[
            ("QUOTE_STORAGE_DIR", "/var/lib/quote"),
            ("QUOTE_STORAGE_KEY", "draft"),
        ]))
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/quote"));
        assert_eq!(config.storage_key, "draft");
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = QuoteConfig::from_lookup(lookup(&[("QUOTE_STORAGE_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "QUOTE_STORAGE_KEY"));
    }
}
