//! Catalog management scenarios: CRUD with existence checks, cached listing,
//! reference policies, and product feedback.

#![allow(clippy::unwrap_used)]

use chrono::Utc;

use clementine_core::{BrandId, CategoryId, ProductId, UserId};
use clementine_storefront::config::ReferencePolicy;
use clementine_storefront::models::{Brand, Category, Feedback};
use clementine_storefront::services::{BrandPatch, CategoryPatch, ProductFilter, ProductPatch};

use clementine_integration_tests::{TestContext, sample_product};

fn sample_category(name: &str) -> Category {
    let now = Utc::now();
    Category {
        id: None,
        name: name.to_owned(),
        description: format!("{name} things"),
        created_at: now,
        updated_at: now,
    }
}

fn sample_brand(name: &str) -> Brand {
    let now = Utc::now();
    Brand {
        id: None,
        name: name.to_owned(),
        description: format!("{name} gear"),
        created_at: now,
        updated_at: now,
    }
}

fn sample_feedback(product_id: &ProductId, rating: u8) -> Feedback {
    let now = Utc::now();
    Feedback {
        id: None,
        product_id: product_id.clone(),
        user_id: UserId::new("u-1"),
        rating,
        content: "Works as described".to_owned(),
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_add_product_assigns_id_and_lists() {
    let ctx = TestContext::new();

    let added = ctx
        .state
        .catalog()
        .add_product(sample_product("seed", 1999))
        .await
        .unwrap();
    let id = added.id.clone().unwrap();

    let fetched = ctx.state.catalog().get_product(&id).await.unwrap();
    assert_eq!(fetched.title, added.title);

    let listed = ctx
        .state
        .catalog()
        .list_products(ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, Some(id));
}

#[tokio::test]
async fn test_active_only_filter_hides_inactive_products() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let active = catalog.add_product(sample_product("a", 100)).await.unwrap();
    let hidden = catalog.add_product(sample_product("b", 200)).await.unwrap();
    catalog
        .update_product(
            hidden.id.as_ref().unwrap(),
            ProductPatch {
                is_active: Some(false),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    let storefront = catalog
        .list_products(ProductFilter { active_only: true })
        .await
        .unwrap();
    assert_eq!(storefront.len(), 1);
    assert_eq!(storefront[0].id, active.id);

    let admin_view = catalog
        .list_products(ProductFilter { active_only: false })
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 2);
}

#[tokio::test]
async fn test_update_product_merges_and_refreshes_updated_at() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let original = catalog
        .add_product(sample_product("seed", 1999))
        .await
        .unwrap();
    let id = original.id.clone().unwrap();

    let updated = catalog
        .update_product(
            &id,
            ProductPatch {
                price: Some(clementine_core::Price::from_minor_units(1499)),
                stock: Some(5),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    // Patched fields change, everything else survives the merge.
    assert_eq!(updated.price.minor_units(), 1499);
    assert_eq!(updated.stock, 5);
    assert_eq!(updated.title, original.title);
    assert_eq!(updated.description, original.description);
    assert!(updated.updated_at > original.updated_at);
    assert_eq!(updated.created_at, original.created_at);
}

#[tokio::test]
async fn test_mutations_on_missing_product_are_not_found() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();
    let ghost = ProductId::new("ghost");

    assert!(catalog.get_product(&ghost).await.unwrap_err().is_not_found());
    assert!(
        catalog
            .update_product(&ghost, ProductPatch::default())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        catalog
            .delete_product(&ghost)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_listing_reflects_mutations_despite_cache() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let first = catalog.add_product(sample_product("a", 100)).await.unwrap();
    // Prime the cache.
    let listed = catalog
        .list_products(ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // Each mutation invalidates, so reads stay current within the TTL.
    catalog.add_product(sample_product("b", 200)).await.unwrap();
    let listed = catalog
        .list_products(ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    catalog.delete_product(first.id.as_ref().unwrap()).await.unwrap();
    let listed = catalog
        .list_products(ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

// ============================================================================
// Categories & brands
// ============================================================================

#[tokio::test]
async fn test_category_round_trip_and_patch() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let added = catalog.add_category(sample_category("Shoes")).await.unwrap();
    let id = added.id.clone().unwrap();

    catalog
        .update_category(
            &id,
            CategoryPatch {
                description: Some("Footwear".to_owned()),
                ..CategoryPatch::default()
            },
        )
        .await
        .unwrap();

    let listed = catalog.list_categories().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Shoes");
    assert_eq!(listed[0].description, "Footwear");
}

#[tokio::test]
async fn test_orphan_policy_allows_deleting_referenced_category() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let category = catalog.add_category(sample_category("Shoes")).await.unwrap();
    let category_id = category.id.clone().unwrap();
    let mut product = sample_product("p", 100);
    product.category_id = category_id.clone();
    catalog.add_product(product).await.unwrap();

    catalog.delete_category(&category_id).await.unwrap();
    assert!(
        catalog
            .list_categories()
            .await
            .unwrap()
            .is_empty()
    );

    // The product keeps its now-dangling reference.
    let products = catalog
        .list_products(ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(products[0].category_id, category_id);
}

#[tokio::test]
async fn test_restrict_policy_refuses_deleting_referenced_category() {
    let ctx = TestContext::with_policy(ReferencePolicy::Restrict);
    let catalog = ctx.state.catalog();

    let category = catalog.add_category(sample_category("Shoes")).await.unwrap();
    let category_id = category.id.clone().unwrap();
    let mut product = sample_product("p", 100);
    product.category_id = category_id.clone();
    let product = catalog.add_product(product).await.unwrap();

    let err = catalog.delete_category(&category_id).await.unwrap_err();
    assert!(matches!(
        err,
        clementine_storefront::AppError::Validation(_)
    ));
    assert_eq!(catalog.list_categories().await.unwrap().len(), 1);

    // Once nothing references it, the delete goes through.
    catalog
        .delete_product(product.id.as_ref().unwrap())
        .await
        .unwrap();
    catalog.delete_category(&category_id).await.unwrap();
}

#[tokio::test]
async fn test_brand_round_trip_and_restrict_policy() {
    let ctx = TestContext::with_policy(ReferencePolicy::Restrict);
    let catalog = ctx.state.catalog();

    let brand = catalog.add_brand(sample_brand("Apex")).await.unwrap();
    let brand_id = brand.id.clone().unwrap();

    catalog
        .update_brand(
            &brand_id,
            BrandPatch {
                name: Some("Apex Sports".to_owned()),
                ..BrandPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(catalog.list_brands().await.unwrap()[0].name, "Apex Sports");

    let mut product = sample_product("p", 100);
    product.brand_id = brand_id.clone();
    catalog.add_product(product).await.unwrap();

    let err = catalog.delete_brand(&brand_id).await.unwrap_err();
    assert!(matches!(
        err,
        clementine_storefront::AppError::Validation(_)
    ));
}

#[tokio::test]
async fn test_delete_missing_brand_is_not_found() {
    let ctx = TestContext::new();
    assert!(
        ctx.state
            .catalog()
            .delete_brand(&BrandId::new("ghost"))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        ctx.state
            .catalog()
            .delete_category(&CategoryId::new("ghost"))
            .await
            .unwrap_err()
            .is_not_found()
    );
}

// ============================================================================
// Feedback
// ============================================================================

#[tokio::test]
async fn test_feedback_requires_valid_rating_and_existing_product() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let product = catalog.add_product(sample_product("p", 100)).await.unwrap();
    let product_id = product.id.clone().unwrap();

    let err = catalog
        .add_feedback(sample_feedback(&product_id, 0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        clementine_storefront::AppError::Validation(_)
    ));
    let err = catalog
        .add_feedback(sample_feedback(&product_id, 6))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        clementine_storefront::AppError::Validation(_)
    ));

    assert!(
        catalog
            .add_feedback(sample_feedback(&ProductId::new("ghost"), 4))
            .await
            .unwrap_err()
            .is_not_found()
    );

    let saved = catalog
        .add_feedback(sample_feedback(&product_id, 4))
        .await
        .unwrap();
    assert!(saved.id.is_some());
}

#[tokio::test]
async fn test_average_rating_over_product_feedback() {
    let ctx = TestContext::new();
    let catalog = ctx.state.catalog();

    let product = catalog.add_product(sample_product("p", 100)).await.unwrap();
    let product_id = product.id.clone().unwrap();
    let other = catalog.add_product(sample_product("q", 100)).await.unwrap();
    let other_id = other.id.clone().unwrap();

    assert_eq!(catalog.average_rating(&product_id).await.unwrap(), None);

    catalog
        .add_feedback(sample_feedback(&product_id, 5))
        .await
        .unwrap();
    catalog
        .add_feedback(sample_feedback(&product_id, 2))
        .await
        .unwrap();
    // Feedback on another product must not bleed in.
    catalog
        .add_feedback(sample_feedback(&other_id, 1))
        .await
        .unwrap();

    let listed = catalog.list_feedback(&product_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(catalog.average_rating(&product_id).await.unwrap(), Some(3.5));
}
