//! Catalog entities: products, categories, brands, cart items, feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{BrandId, CategoryId, FeedbackId, Price, ProductId, UserId};

/// A sellable product.
///
/// `is_active` soft-filters storefront queries; inactive products stay
/// visible to admin queries and inside historical order snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub title: String,
    /// Unit price in minor currency units.
    pub price: Price,
    /// Units in stock.
    pub stock: u32,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    /// Image URL.
    pub image: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BrandId>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product snapshot in the cart, extended with a quantity.
///
/// The snapshot is deliberate: a later price change must not alter what the
/// customer saw when they added the item, nor what an order records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Selected quantity, always >= 1 inside a cart.
    pub quantity: u32,
}

impl CartItem {
    /// The product id this line refers to, if the snapshot was persisted.
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.id.as_ref()
    }

    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.saturating_mul(self.quantity)
    }
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeedbackId>,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Star rating, 1 through 5.
    pub rating: u8,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    pub(crate) fn sample_product(id: &str, price_minor: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Some(ProductId::new(id)),
            title: format!("Product {id}"),
            price: Price::from_minor_units(price_minor),
            stock: 10,
            category_id: CategoryId::new("cat-1"),
            brand_id: BrandId::new("brand-1"),
            image: "https://img.example/p.jpg".to_owned(),
            description: "A product".to_owned(),
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    #[test]
    fn test_cart_item_line_total() {
        let item = CartItem {
            product: sample_product("p-1", 1250),
            quantity: 3,
        };
        assert_eq!(item.line_total(), Price::from_minor_units(3750));
    }

    #[test]
    fn test_cart_item_serializes_flattened() {
        let item = CartItem {
            product: sample_product("p-1", 1250),
            quantity: 2,
        };
        let value = serde_json::to_value(&item).unwrap();
        // quantity sits beside the product fields, matching stored documents
        assert_eq!(value["quantity"], 2);
        assert_eq!(value["price"], 1250);
        assert_eq!(value["isActive"], true);
        assert_eq!(value["categoryId"], "cat-1");
    }

    #[test]
    fn test_unpersisted_product_omits_id() {
        let mut product = sample_product("p-1", 100);
        product.id = None;
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("id").is_none());
    }
}
