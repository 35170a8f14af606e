//! In-memory document store for tests and local development.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, FieldFilter, StoreError};

/// A [`DocumentStore`] held entirely in memory.
///
/// Collections are created lazily on first write. Listing returns documents
/// in insertion-id order, which is stable within a test run.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Whether `collection` holds no documents.
    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

fn merge_patch(doc: &mut Value, patch: Value) {
    if let (Value::Object(doc_map), Value::Object(patch_map)) = (doc, patch) {
        for (key, value) in patch_map {
            doc_map.insert(key, value);
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, mut doc: Value) -> Result<String, StoreError> {
        let Some(map) = doc.as_object_mut() else {
            return Err(StoreError::InvalidDocument);
        };
        let id = Uuid::new_v4().to_string();
        map.insert("id".to_owned(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.is_none_or(|f| f.matches(doc)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::MissingDocument {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
        merge_patch(doc, patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_injects_id() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create("products", json!({"title": "Widget"}))
            .await
            .unwrap();

        let doc = store.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc["id"], id.as_str());
        assert_eq!(doc["title"], "Widget");
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.create("products", json!([1, 2])).await,
            Err(StoreError::InvalidDocument)
        ));
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let store = MemoryDocumentStore::new();
        store
            .create("orders", json!({"userId": "u-1"}))
            .await
            .unwrap();
        store
            .create("orders", json!({"userId": "u-2"}))
            .await
            .unwrap();

        let filter = FieldFilter::equals("userId", "u-1");
        let mine = store.list("orders", Some(&filter)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["userId"], "u-1");

        let all = store.list("orders", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create("products", json!({"title": "Widget", "stock": 4}))
            .await
            .unwrap();

        store
            .update("products", &id, json!({"stock": 3}))
            .await
            .unwrap();

        let doc = store.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc["stock"], 3);
        assert_eq!(doc["title"], "Widget");
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.update("products", "nope", json!({})).await,
            Err(StoreError::MissingDocument { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let id = store.create("brands", json!({"name": "Acme"})).await.unwrap();
        store.delete("brands", &id).await.unwrap();
        store.delete("brands", &id).await.unwrap();
        assert!(store.get("brands", &id).await.unwrap().is_none());
    }
}
