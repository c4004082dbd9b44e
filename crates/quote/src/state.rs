//! Shared quote context.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::cart::QuoteCart;
use crate::catalog::Catalog;
use crate::config::QuoteConfig;
use crate::error::Result;
use crate::storage::{FileStore, SharedStore};

/// Everything a cart needs, shared across tabs.
///
/// This struct is cheaply cloneable via `Arc`. Each call to [`open_cart`]
/// gives a new tab over the same store.
///
/// [`open_cart`]: Self::open_cart
#[derive(Clone)]
pub struct QuoteContext {
    inner: Arc<QuoteContextInner>,
}

struct QuoteContextInner {
    config: QuoteConfig,
    store: SharedStore,
    catalog: Catalog,
}

impl std::fmt::Debug for QuoteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteContext")
            .field("config", &self.inner.config)
            .field("categories", &self.inner.catalog.categories().len())
            .finish_non_exhaustive()
    }
}

impl QuoteContext {
    /// Create a context from already constructed parts.
    #[must_use]
    pub fn new(config: QuoteConfig, store: SharedStore, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(QuoteContextInner {
                config,
                store,
                catalog,
            }),
        }
    }

    /// Load [`QuoteConfig`] from the environment and build a context from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or
    /// [`from_config`](Self::from_config) fails.
    pub fn from_env() -> Result<Self> {
        Self::from_config(QuoteConfig::from_env()?)
    }

    /// Open the file store and load the catalog named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created or the
    /// catalog cannot be read.
    #[instrument(skip_all, fields(storage_dir = %config.storage_dir.display()))]
    pub fn from_config(config: QuoteConfig) -> Result<Self> {
        let store = FileStore::open(&config.storage_dir)?;
        let catalog = Catalog::load(&config.catalog_path)?;
        info!(
            categories = catalog.categories().len(),
            "Quote context ready"
        );
        Ok(Self::new(config, Arc::new(store), catalog))
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &QuoteConfig {
        &self.inner.config
    }

    /// Get a reference to the shared store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// A new tab on the configured slot, rehydrated from storage.
    #[must_use]
    pub fn open_cart(&self) -> QuoteCart {
        let mut cart = QuoteCart::with_key(
            Arc::clone(&self.inner.store),
            self.inner.config.storage_key.clone(),
        );
        cart.load_from_storage();
        cart
    }
}
