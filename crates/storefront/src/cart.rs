//! Durable per-session shopping cart.
//!
//! The cart is the authoritative in-session list of [`CartItem`]s, persisted
//! to local storage after every mutation (the persistence contract is eager,
//! not batched) and rehydrated at session start. Derived totals are
//! recomputed from current state on every read, never cached.
//!
//! Mutations take `&mut self`, so a session's cart edits are serialized by
//! the borrow checker; there is no cross-device merging (last writer to
//! storage wins).

use std::sync::Arc;

use tracing::{debug, warn};

use clementine_core::{Price, ProductId};

use crate::models::{CartItem, Product};
use crate::storage::{CART_KEY, KeyValueStorage, StorageError};

/// The shopping cart state container.
pub struct Cart<S: KeyValueStorage> {
    items: Vec<CartItem>,
    storage: Arc<S>,
}

impl<S: KeyValueStorage> Cart<S> {
    /// Rehydrate the cart from local storage.
    ///
    /// A missing or unreadable payload yields an empty cart; a corrupt one
    /// is logged and discarded. Session start must never fail on cart
    /// state.
    pub fn load(storage: Arc<S>) -> Self {
        let items = match storage.get(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(err) => {
                    warn!(error = %err, "discarding corrupt cart payload");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "cart storage unreadable, starting empty");
                Vec::new()
            }
        };
        debug!(items = items.len(), "cart loaded");
        Self { items, storage }
    }

    /// Add `quantity` of `product`.
    ///
    /// If an item with the same product id already exists its quantity is
    /// incremented; otherwise a new line is appended. A zero quantity is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting the updated cart fails; the
    /// in-memory state is already updated.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<(), StorageError> {
        if quantity == 0 {
            return Ok(());
        }

        let existing = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id);
        match existing {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { product, quantity }),
        }
        self.save()
    }

    /// Replace the quantity of the item with `product_id`.
    ///
    /// A zero quantity removes the item. An absent product id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting the updated cart fails.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        if quantity == 0 {
            return self.remove(product_id);
        }

        for item in &mut self.items {
            if item.product_id() == Some(product_id) {
                item.quantity = quantity;
            }
        }
        self.save()
    }

    /// Remove the item with `product_id`, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting the updated cart fails.
    pub fn remove(&mut self, product_id: &ProductId) -> Result<(), StorageError> {
        self.items.retain(|item| item.product_id() != Some(product_id));
        self.save()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting the empty cart fails; the
    /// in-memory cart is already empty.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.save()
    }

    /// Persist the current item list.
    ///
    /// Called after every mutating operation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub fn save(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.items)
            .map_err(|err| StorageError::Io(std::io::Error::other(err)))?;
        self.storage.set(CART_KEY, &raw)
    }

    /// Current items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Clone the current item list, e.g. as an order snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all items. Recomputed on every call.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Sum of price times quantity over all items. Recomputed on every call.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}
