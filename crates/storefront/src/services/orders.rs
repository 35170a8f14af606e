//! Order placement and status lifecycle.
//!
//! Placing an order turns a cart snapshot plus a delivery address into a
//! single document in the `orders` collection, then clears the cart. The
//! two steps are not atomic: a cart-clear failure after a successful write
//! leaves a stale cart alongside a valid order, which is tolerated and
//! logged rather than treated as fatal.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{info, instrument, warn};

use clementine_core::{OrderId, OrderStatus, TrackingNumber, UserId};

use crate::cart::Cart;
use crate::docstore::{DocumentStore, FieldFilter, StoreError, collections};
use crate::error::{AppError, Result};
use crate::models::{AddressDelivery, Order, User};
use crate::storage::KeyValueStorage;

use super::decode_documents;

/// Fixed offset from creation to the estimated delivery date.
pub const ESTIMATED_DELIVERY_DAYS: i64 = 7;

/// Order workflow service.
pub struct OrderService<D: DocumentStore> {
    store: Arc<D>,
}

impl<D: DocumentStore> OrderService<D> {
    /// Create an order service.
    #[must_use]
    pub const fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Convert the current cart into a persisted order.
    ///
    /// Computes the total from the snapshot, stamps timestamps, assigns a
    /// tracking number, writes a single document with initial status
    /// `processing`, and clears the cart on success. On store failure the
    /// cart is left untouched and no partial order is visible.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty cart and
    /// `AppError::Remote` if the store write fails.
    #[instrument(skip(self, cart, address))]
    pub async fn place_order<S: KeyValueStorage>(
        &self,
        cart: &mut Cart<S>,
        address: AddressDelivery,
        user_id: &UserId,
    ) -> Result<Order> {
        if cart.is_empty() {
            return Err(AppError::Validation(
                "Cannot place an order with an empty cart".to_owned(),
            ));
        }

        let now = Utc::now();
        let mut order = Order {
            id: None,
            user_id: user_id.clone(),
            total: cart.total_price(),
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
            estimated_delivery: now + Duration::days(ESTIMATED_DELIVERY_DAYS),
            tracking_number: TrackingNumber::generate(),
            items: cart.snapshot(),
            address_delivery: address,
        };

        let id = self
            .store
            .create(
                collections::ORDERS,
                serde_json::to_value(&order).map_err(StoreError::from)?,
            )
            .await?;
        order.id = Some(OrderId::new(id));

        // The order exists; a failed cart clear is a degraded state, not a
        // failed placement.
        if let Err(err) = cart.clear() {
            warn!(
                error = %err,
                order_id = %order.id.as_ref().map_or("", |id| id.as_str()),
                "order placed but cart clear failed; cart is stale"
            );
        }

        info!(
            order_id = %order.id.as_ref().map_or("", |id| id.as_str()),
            total = %order.total,
            "order placed"
        );
        Ok(order)
    }

    /// List orders visible to `user`.
    ///
    /// Admins see every order; everyone else only their own. Sorted by
    /// creation timestamp descending so callers get a deterministic order
    /// regardless of the store's default.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store is unreachable.
    #[instrument(skip(self, user), fields(uid = %user.uid, admin = user.is_admin()))]
    pub async fn list_orders(&self, user: &User) -> Result<Vec<Order>> {
        let filter = if user.is_admin() {
            None
        } else {
            Some(FieldFilter::equals("userId", user.uid.as_str()))
        };

        let docs = self.store.list(collections::ORDERS, filter.as_ref()).await?;
        let mut orders: Vec<Order> = decode_documents(docs)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Transition an order to `new_status` and refresh its `updatedAt`.
    ///
    /// Only `processing -> shipped` and `shipped -> delivered` are legal;
    /// anything else, including any transition out of a terminal state, is
    /// rejected without touching the document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist and
    /// `AppError::Validation` for an illegal transition.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let doc = self
            .store
            .get(collections::ORDERS, order_id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;
        let mut order: Order = serde_json::from_value(doc).map_err(StoreError::from)?;

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::Validation(format!(
                "Order cannot move from {} to {}",
                order.status, new_status
            )));
        }

        let now = Utc::now();
        self.store
            .update(
                collections::ORDERS,
                order_id.as_str(),
                json!({ "status": new_status, "updatedAt": now }),
            )
            .await?;

        order.status = new_status;
        order.updated_at = now;
        info!(order_id = %order_id, status = %new_status, "order status updated");
        Ok(order)
    }
}
