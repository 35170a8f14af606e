//! HTTP client for the hosted document store.
//!
//! Plain JSON REST: documents live at
//! `{base}/collections/{collection}/documents[/{id}]`, authenticated with a
//! bearer API key. Equality filters become `?field=...&equals=...` query
//! parameters.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::DocStoreConfig;

use super::{DocumentStore, FieldFilter, StoreError};

/// Client for the hosted document store REST API.
///
/// Cheaply cloneable; the HTTP connection pool and credentials live behind
/// an `Arc`.
#[derive(Clone)]
pub struct RestDocumentStore {
    inner: Arc<RestDocumentStoreInner>,
}

struct RestDocumentStoreInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Deserialize)]
struct ListResponse {
    documents: Vec<Value>,
}

impl RestDocumentStore {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &DocStoreConfig) -> Self {
        Self {
            inner: Arc::new(RestDocumentStoreInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}/documents", self.inner.base_url)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{id}", self.documents_url(collection))
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(&self.inner.api_key)
    }

    /// Fail on any status outside the expected set.
    async fn unexpected_status(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::Status { status, body }
    }
}

impl DocumentStore for RestDocumentStore {
    #[instrument(skip(self, doc))]
    async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
        if !doc.is_object() {
            return Err(StoreError::InvalidDocument);
        }

        let response = self
            .request(reqwest::Method::POST, self.documents_url(collection))
            .json(&doc)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::unexpected_status(response).await);
        }

        let created: CreateResponse = response.json().await?;
        debug!(collection, id = %created.id, "document created");
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.document_url(collection, id))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response).await);
        }

        Ok(Some(response.json().await?))
    }

    #[instrument(skip(self, filter))]
    async fn list(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut request = self.request(reqwest::Method::GET, self.documents_url(collection));
        if let Some(filter) = filter {
            // Non-string values travel as their JSON text form.
            let value = match &filter.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            request = request.query(&[("field", filter.field.as_str()), ("equals", &value)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response).await);
        }

        let listed: ListResponse = response.json().await?;
        debug!(collection, count = listed.documents.len(), "documents listed");
        Ok(listed.documents)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::PATCH, self.document_url(collection, id))
            .json(&patch)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::MissingDocument {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response).await);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::DELETE, self.document_url(collection, id))
            .send()
            .await?;

        // Deleting an absent document is a no-op.
        if response.status() == reqwest::StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(Self::unexpected_status(response).await)
    }
}
