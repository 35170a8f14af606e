//! Application services over the document store.
//!
//! - [`catalog`] - product/category/brand reads (cached) and mutations
//! - [`orders`] - order placement and status lifecycle
//! - [`auth`] - thin client for the external authentication service

pub mod auth;
pub mod catalog;
pub mod orders;

pub use auth::AuthClient;
pub use catalog::{BrandPatch, CatalogService, CategoryPatch, ProductFilter, ProductPatch};
pub use orders::OrderService;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::docstore::StoreError;

/// Decode a batch of store documents into typed models.
pub(crate) fn decode_documents<T: DeserializeOwned>(
    docs: Vec<Value>,
) -> Result<Vec<T>, StoreError> {
    docs.into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}
