//! Integration tests for Clementine.
//!
//! Scenario tests exercising the cart, order workflow, and catalog services
//! together against the in-memory document store. No external services are
//! required; the REST client has its own wiremock coverage inside the
//! storefront crate.
//!
//! Run with: `cargo test -p clementine-integration-tests`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use clementine_core::{BrandId, CategoryId, Email, Price, ProductId, Role, UserId};
use clementine_storefront::config::{AuthConfig, DocStoreConfig, ReferencePolicy, StoreConfig};
use clementine_storefront::docstore::MemoryDocumentStore;
use clementine_storefront::models::{AddressDelivery, Product, User};
use clementine_storefront::storage::MemoryStorage;
use clementine_storefront::AppState;

/// Test context: app state over in-memory collaborators.
pub struct TestContext {
    pub state: AppState<MemoryDocumentStore, MemoryStorage>,
    pub store: Arc<MemoryDocumentStore>,
    pub storage: Arc<MemoryStorage>,
}

impl TestContext {
    /// Build a context with the default (orphan) reference policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(ReferencePolicy::Orphan)
    }

    /// Build a context with an explicit reference policy.
    #[must_use]
    pub fn with_policy(policy: ReferencePolicy) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::with_parts(
            test_config(policy),
            Arc::clone(&store),
            Arc::clone(&storage),
        );
        Self {
            state,
            store,
            storage,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration pointing nowhere; tests never leave the process.
#[must_use]
pub fn test_config(policy: ReferencePolicy) -> StoreConfig {
    StoreConfig {
        docstore: DocStoreConfig {
            base_url: "http://docstore.invalid".to_owned(),
            api_key: "test".into(),
        },
        auth: AuthConfig {
            base_url: "http://auth.invalid".to_owned(),
            api_key: "test".into(),
            admin_emails: vec!["boss@example.com".to_owned()],
        },
        data_dir: PathBuf::from(".clementine-test"),
        catalog_cache_ttl: Duration::from_secs(300),
        reference_policy: policy,
    }
}

/// A product ready to be added to a cart or the catalog.
#[must_use]
pub fn sample_product(id: &str, price_minor: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Some(ProductId::new(id)),
        title: format!("Product {id}"),
        price: Price::from_minor_units(price_minor),
        stock: 25,
        category_id: CategoryId::new("cat-1"),
        brand_id: BrandId::new("brand-1"),
        image: "https://img.example/p.jpg".to_owned(),
        description: "A test product".to_owned(),
        created_at: now,
        updated_at: now,
        is_active: true,
    }
}

/// A user profile with the given uid and role.
///
/// # Panics
///
/// Never; the sample email is valid.
#[must_use]
pub fn sample_user(uid: &str, role: Role) -> User {
    let now = Utc::now();
    #[allow(clippy::unwrap_used)]
    let email = Email::parse(&format!("{uid}@example.com")).unwrap();
    User {
        uid: UserId::new(uid),
        full_name: format!("User {uid}"),
        email,
        phone: "0123456789".to_owned(),
        address: None,
        district: None,
        province_city: None,
        avatar: None,
        bio: None,
        role,
        created_at: now,
        updated_at: now,
        is_active: true,
        is_deleted: false,
    }
}

/// A delivery address for checkout.
///
/// # Panics
///
/// Never; the sample email is valid.
#[must_use]
pub fn sample_address() -> AddressDelivery {
    #[allow(clippy::unwrap_used)]
    let email = Email::parse("ada@example.com").unwrap();
    AddressDelivery {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email,
        phone: "0123456789".to_owned(),
        address: "1 Analytical Way".to_owned(),
        district: "District 1".to_owned(),
        province_city: "London".to_owned(),
    }
}
