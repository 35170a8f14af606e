//! Order and delivery address models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{Email, OrderId, OrderStatus, Price, TrackingNumber, UserId};

use super::catalog::CartItem;

/// Delivery address captured at checkout.
///
/// A plain value object embedded in the order document; not separately
/// persisted or reused across orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDelivery {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub district: String,
    // Stored documents use this exact snake_case name.
    #[serde(rename = "province_city")]
    pub province_city: String,
}

/// A placed order.
///
/// Immutable after creation except for `status` and `updated_at`. `items`
/// is the cart snapshot at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    /// Owning user.
    pub user_id: UserId,
    /// Total computed from `items` at placement time.
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fixed offset from `created_at`.
    pub estimated_delivery: DateTime<Utc>,
    pub tracking_number: TrackingNumber,
    /// Cart snapshot at placement time.
    pub items: Vec<CartItem>,
    pub address_delivery: AddressDelivery,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_address() -> AddressDelivery {
        AddressDelivery {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            phone: "0123456789".to_owned(),
            address: "1 Analytical Way".to_owned(),
            district: "District 1".to_owned(),
            province_city: "London".to_owned(),
        }
    }

    #[test]
    fn test_address_wire_names() {
        let value = serde_json::to_value(sample_address()).unwrap();
        assert_eq!(value["firstName"], "Ada");
        // province_city keeps its stored snake_case name
        assert_eq!(value["province_city"], "London");
    }

    #[test]
    fn test_order_round_trip() {
        let now = Utc::now();
        let order = Order {
            id: Some(OrderId::new("o-1")),
            user_id: UserId::new("u-1"),
            total: Price::from_minor_units(5000),
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
            estimated_delivery: now + chrono::Duration::days(7),
            tracking_number: TrackingNumber::generate(),
            items: Vec::new(),
            address_delivery: sample_address(),
        };
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
