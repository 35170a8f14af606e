//! Application state shared across the UI.
//!
//! Everything stateful is constructed here exactly once per application
//! instance and injected into the services; nothing in this crate reaches
//! for ambient singletons. The whole container drops cleanly on shutdown.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cart::Cart;
use crate::config::StoreConfig;
use crate::docstore::{DocumentStore, RestDocumentStore};
use crate::services::{AuthClient, CatalogService, OrderService};
use crate::storage::{FileStorage, KeyValueStorage, StorageError};

/// Application state: configuration, store client, services, and the cart.
///
/// The cart needs exclusive access for mutation, so it sits behind a
/// mutex; every other member is read-shared. In the single-threaded
/// event model the UI runs, the lock is uncontended and each cart
/// mutation runs to completion before the next event.
pub struct AppState<D: DocumentStore, S: KeyValueStorage> {
    config: StoreConfig,
    store: Arc<D>,
    catalog: CatalogService<D>,
    orders: OrderService<D>,
    auth: AuthClient<D, S>,
    cart: Mutex<Cart<S>>,
}

impl AppState<RestDocumentStore, FileStorage> {
    /// Build the production state: REST document store, file-backed local
    /// storage under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the data directory cannot be created.
    pub fn new(config: StoreConfig) -> Result<Self, StorageError> {
        let store = Arc::new(RestDocumentStore::new(&config.docstore));
        let storage = Arc::new(FileStorage::new(config.data_dir.clone())?);
        Ok(Self::with_parts(config, store, storage))
    }
}

impl<D: DocumentStore, S: KeyValueStorage> AppState<D, S> {
    /// Build state from explicit collaborators (tests inject the in-memory
    /// store and storage here).
    #[must_use]
    pub fn with_parts(config: StoreConfig, store: Arc<D>, storage: Arc<S>) -> Self {
        let catalog = CatalogService::new(
            Arc::clone(&store),
            config.catalog_cache_ttl,
            config.reference_policy,
        );
        let orders = OrderService::new(Arc::clone(&store));
        let auth = AuthClient::new(&config.auth, Arc::clone(&store), Arc::clone(&storage));
        let cart = Mutex::new(Cart::load(storage));

        Self {
            config,
            store,
            catalog,
            orders,
            auth,
            cart,
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The document store client.
    #[must_use]
    pub const fn store(&self) -> &Arc<D> {
        &self.store
    }

    /// The catalog service.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogService<D> {
        &self.catalog
    }

    /// The order workflow service.
    #[must_use]
    pub const fn orders(&self) -> &OrderService<D> {
        &self.orders
    }

    /// The authentication client.
    #[must_use]
    pub const fn auth(&self) -> &AuthClient<D, S> {
        &self.auth
    }

    /// Exclusive access to the cart.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder panicked while mutating the cart.
    #[must_use]
    pub fn cart(&self) -> MutexGuard<'_, Cart<S>> {
        self.cart.lock().unwrap_or_else(|e| e.into_inner())
    }
}
