//! Catalog read layer and mutations.
//!
//! Reads fetch full collections (no pagination; the catalog is small) and
//! are cached with a TTL; every mutation invalidates the affected entries.
//! Mutations pre-check existence and apply merge-patches with a refreshed
//! `updatedAt`, matching the document conventions of the store.

use std::sync::Arc;

use chrono::Utc;
use moka::future::Cache;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};

use clementine_core::{BrandId, CategoryId, Price, ProductId};

use crate::config::ReferencePolicy;
use crate::docstore::{DocumentStore, FieldFilter, StoreError, collections};
use crate::error::{AppError, Result};
use crate::models::{Brand, Category, Feedback, Product};

use super::decode_documents;

const CACHE_CAPACITY: u64 = 64;

/// Closed filter for product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductFilter {
    /// Storefront view: only products with the active flag set. Admin
    /// queries pass `false` and see everything.
    pub active_only: bool,
}

/// Merge-patch for a product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<BrandId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Merge-patch for a category.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Merge-patch for a brand.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products { active_only: bool },
    Categories,
    Brands,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}

/// Catalog service: cached reads, existence-checked mutations.
pub struct CatalogService<D: DocumentStore> {
    store: Arc<D>,
    cache: Cache<CacheKey, CacheValue>,
    reference_policy: ReferencePolicy,
}

impl<D: DocumentStore> CatalogService<D> {
    /// Create a catalog service.
    #[must_use]
    pub fn new(
        store: Arc<D>,
        cache_ttl: std::time::Duration,
        reference_policy: ReferencePolicy,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();
        Self {
            store,
            cache,
            reference_policy,
        }
    }

    async fn invalidate_products(&self) {
        self.cache
            .invalidate(&CacheKey::Products { active_only: true })
            .await;
        self.cache
            .invalidate(&CacheKey::Products { active_only: false })
            .await;
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally restricted to active ones.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let key = CacheKey::Products {
            active_only: filter.active_only,
        };
        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!("product list served from cache");
            return Ok(products);
        }

        let store_filter = filter
            .active_only
            .then(|| FieldFilter::equals("isActive", true));
        let docs = self
            .store
            .list(collections::PRODUCTS, store_filter.as_ref())
            .await?;
        let products: Vec<Product> = decode_documents(docs)?;

        self.cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product> {
        let doc = self
            .store
            .get(collections::PRODUCTS, id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;
        Ok(serde_json::from_value(doc).map_err(StoreError::from)?)
    }

    /// Create a product. The store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store rejects the write.
    #[instrument(skip(self, product))]
    pub async fn add_product(&self, mut product: Product) -> Result<Product> {
        let now = Utc::now();
        product.id = None;
        product.created_at = now;
        product.updated_at = now;

        let id = self
            .store
            .create(collections::PRODUCTS, serde_json::to_value(&product).map_err(StoreError::from)?)
            .await?;
        product.id = Some(ProductId::new(id));

        self.invalidate_products().await;
        Ok(product)
    }

    /// Merge-patch an existing product and refresh its `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist.
    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> Result<Product> {
        self.get_product(id).await?;

        let mut doc = serde_json::to_value(&patch).map_err(StoreError::from)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("updatedAt".to_owned(), json!(Utc::now()));
        }
        self.store
            .update(collections::PRODUCTS, id.as_str(), doc)
            .await?;

        self.invalidate_products().await;
        self.get_product(id).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.get_product(id).await?;
        self.store
            .delete(collections::PRODUCTS, id.as_str())
            .await?;
        self.invalidate_products().await;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            debug!("category list served from cache");
            return Ok(categories);
        }

        let docs = self.store.list(collections::CATEGORIES, None).await?;
        let categories: Vec<Category> = decode_documents(docs)?;
        self.cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Create a category. The store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store rejects the write.
    #[instrument(skip(self, category))]
    pub async fn add_category(&self, mut category: Category) -> Result<Category> {
        let now = Utc::now();
        category.id = None;
        category.created_at = now;
        category.updated_at = now;

        let id = self
            .store
            .create(
                collections::CATEGORIES,
                serde_json::to_value(&category).map_err(StoreError::from)?,
            )
            .await?;
        category.id = Some(CategoryId::new(id));

        self.cache.invalidate(&CacheKey::Categories).await;
        Ok(category)
    }

    /// Merge-patch an existing category and refresh its `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist.
    #[instrument(skip(self, patch))]
    pub async fn update_category(&self, id: &CategoryId, patch: CategoryPatch) -> Result<()> {
        self.require_exists(collections::CATEGORIES, id.as_str(), "Category")
            .await?;

        let mut doc = serde_json::to_value(&patch).map_err(StoreError::from)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("updatedAt".to_owned(), json!(Utc::now()));
        }
        self.store
            .update(collections::CATEGORIES, id.as_str(), doc)
            .await?;
        self.cache.invalidate(&CacheKey::Categories).await;
        Ok(())
    }

    /// Delete a category, honoring the configured [`ReferencePolicy`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist, or
    /// `AppError::Validation` under `Restrict` while products still
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.require_exists(collections::CATEGORIES, id.as_str(), "Category")
            .await?;
        self.check_references("categoryId", id.as_str(), "category")
            .await?;

        self.store
            .delete(collections::CATEGORIES, id.as_str())
            .await?;
        self.cache.invalidate(&CacheKey::Categories).await;
        Ok(())
    }

    // =========================================================================
    // Brands
    // =========================================================================

    /// List all brands.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<Brand>> {
        if let Some(CacheValue::Brands(brands)) = self.cache.get(&CacheKey::Brands).await {
            debug!("brand list served from cache");
            return Ok(brands);
        }

        let docs = self.store.list(collections::BRANDS, None).await?;
        let brands: Vec<Brand> = decode_documents(docs)?;
        self.cache
            .insert(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;
        Ok(brands)
    }

    /// Create a brand. The store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store rejects the write.
    #[instrument(skip(self, brand))]
    pub async fn add_brand(&self, mut brand: Brand) -> Result<Brand> {
        let now = Utc::now();
        brand.id = None;
        brand.created_at = now;
        brand.updated_at = now;

        let id = self
            .store
            .create(
                collections::BRANDS,
                serde_json::to_value(&brand).map_err(StoreError::from)?,
            )
            .await?;
        brand.id = Some(BrandId::new(id));

        self.cache.invalidate(&CacheKey::Brands).await;
        Ok(brand)
    }

    /// Merge-patch an existing brand and refresh its `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist.
    #[instrument(skip(self, patch))]
    pub async fn update_brand(&self, id: &BrandId, patch: BrandPatch) -> Result<()> {
        self.require_exists(collections::BRANDS, id.as_str(), "Brand")
            .await?;

        let mut doc = serde_json::to_value(&patch).map_err(StoreError::from)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("updatedAt".to_owned(), json!(Utc::now()));
        }
        self.store
            .update(collections::BRANDS, id.as_str(), doc)
            .await?;
        self.cache.invalidate(&CacheKey::Brands).await;
        Ok(())
    }

    /// Delete a brand, honoring the configured [`ReferencePolicy`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id does not exist, or
    /// `AppError::Validation` under `Restrict` while products still
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_brand(&self, id: &BrandId) -> Result<()> {
        self.require_exists(collections::BRANDS, id.as_str(), "Brand")
            .await?;
        self.check_references("brandId", id.as_str(), "brand")
            .await?;

        self.store.delete(collections::BRANDS, id.as_str()).await?;
        self.cache.invalidate(&CacheKey::Brands).await;
        Ok(())
    }

    // =========================================================================
    // Feedback
    // =========================================================================

    /// Record a product review.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the rating is outside 1..=5, or
    /// `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self, feedback))]
    pub async fn add_feedback(&self, mut feedback: Feedback) -> Result<Feedback> {
        if !(1..=5).contains(&feedback.rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_owned(),
            ));
        }
        self.get_product(&feedback.product_id).await?;

        let now = Utc::now();
        feedback.id = None;
        feedback.created_at = now;
        feedback.updated_at = now;

        let id = self
            .store
            .create(
                collections::FEEDBACKS,
                serde_json::to_value(&feedback).map_err(StoreError::from)?,
            )
            .await?;
        feedback.id = Some(clementine_core::FeedbackId::new(id));
        Ok(feedback)
    }

    /// List reviews for one product. Uncached; feedback is read rarely.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store is unreachable.
    pub async fn list_feedback(&self, product_id: &ProductId) -> Result<Vec<Feedback>> {
        let filter = FieldFilter::equals("productId", product_id.as_str());
        let docs = self
            .store
            .list(collections::FEEDBACKS, Some(&filter))
            .await?;
        Ok(decode_documents(docs)?)
    }

    /// Average rating for a product, `None` when it has no feedback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the store is unreachable.
    pub async fn average_rating(&self, product_id: &ProductId) -> Result<Option<f64>> {
        let feedback = self.list_feedback(product_id).await?;
        if feedback.is_empty() {
            return Ok(None);
        }
        let sum: u32 = feedback.iter().map(|f| u32::from(f.rating)).sum();
        #[allow(clippy::cast_precision_loss)]
        Ok(Some(f64::from(sum) / feedback.len() as f64))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn require_exists(&self, collection: &str, id: &str, what: &str) -> Result<()> {
        self.store
            .get(collection, id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(what.to_owned()))
    }

    async fn check_references(&self, field: &str, id: &str, what: &str) -> Result<()> {
        if self.reference_policy == ReferencePolicy::Orphan {
            return Ok(());
        }

        let filter = FieldFilter::equals(field, id);
        let referencing = self
            .store
            .list(collections::PRODUCTS, Some(&filter))
            .await?;
        if referencing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Cannot delete {what}: {} product(s) still reference it",
                referencing.len()
            )))
        }
    }
}
