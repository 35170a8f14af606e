//! Hosted document store client.
//!
//! The store is schemaless: collection-scoped CRUD over JSON documents with
//! server-generated string ids. The [`DocumentStore`] trait is the exact
//! contract the services consume; [`RestDocumentStore`] speaks it over HTTP
//! and [`MemoryDocumentStore`] backs tests and local development.
//!
//! Documents cross this boundary as `serde_json::Value`; the services own
//! the typed view. A created document gains an `id` field injected by the
//! store, so reads always carry the identifier inside the document.

mod memory;
mod rest;

pub use memory::MemoryDocumentStore;
pub use rest::RestDocumentStore;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

/// Collection names used by the storefront.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const BRANDS: &str = "brands";
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
    pub const FEEDBACKS: &str = "feedbacks";
}

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status.
    #[error("store returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },

    /// A document failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The target document does not exist.
    #[error("document {id} not found in {collection}")]
    MissingDocument {
        collection: String,
        id: String,
    },

    /// The payload is not a JSON object and cannot carry an id.
    #[error("document must be a JSON object")]
    InvalidDocument,
}

/// A single equality filter on a document field.
///
/// The only query shape the storefront needs; a closed structure instead of
/// an open-ended query object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    /// Document field name (wire form, e.g. `userId`).
    pub field: String,
    /// Value the field must equal.
    pub value: Value,
}

impl FieldFilter {
    /// Filter documents whose `field` equals `value`.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether a document matches this filter.
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Collection-scoped CRUD against the hosted document store.
///
/// Every operation is async and fallible; callers treat each call as a
/// potential point of failure and latency. Updates are merge-patches: keys
/// in the patch overwrite, everything else is preserved.
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-generated id.
    ///
    /// The stored document gains an `id` field carrying the generated id,
    /// which is also returned.
    fn create(
        &self,
        collection: &str,
        doc: Value,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Fetch a document by id, `None` if absent.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// List documents, optionally narrowed by an equality filter.
    ///
    /// The full matching set is returned; no ordering is guaranteed beyond
    /// the store's default.
    fn list(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;

    /// Merge-patch a document.
    ///
    /// Fails with [`StoreError::MissingDocument`] if the id does not exist.
    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a document. Deleting an absent id is a no-op.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
