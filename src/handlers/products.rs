//! Product catalog HTTP handlers.
//!
//! This module implements the read-side API:
//! - GET /api/v1/products - List products assigned to the client
//! - GET /api/v1/products/{id} - Product detail with form fields and
//!   the client-specific resolved price
//!
//! Both endpoints sit behind the access gate, so the handlers trust
//! the injected [`AuthContext`] instead of re-validating the token.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::product::{
        ProductDetail, ProductListResponse, ProductResponse, ProductSummary,
    },
    services::{catalog::FieldCatalogResolver, pricing::PricingResolver},
};

/// List all products assigned to the authenticated client.
///
/// # Endpoint
///
/// `GET /api/v1/products`
///
/// # Response
///
/// - **200 OK**: `{"success": true, "products": [...]}` (may be empty)
/// - **401**: Invalid or missing token
/// - **429**: Hourly quota exhausted
/// - **500**: Store failure
///
/// Each entry carries the price this client would pay - a plain
/// discounted amount or a `"{min}-{max}"` range for dynamically priced
/// products. Inactive products and products assigned to other clients
/// never appear.
pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProductListResponse>, AppError> {
    let catalog_resolver = FieldCatalogResolver::new(state.store.clone());
    let pricing_resolver = PricingResolver::new(state.store.clone());

    let assignments = state.store.list_assignments(&auth.client_id).await?;
    let mut products = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        // Assignments can outlive their product; skip dangling or
        // deactivated ones rather than failing the whole listing
        let Some(product) = state.store.get_product(&assignment.product_id).await? else {
            continue;
        };
        if !product.active {
            continue;
        }

        let fields = catalog_resolver.resolve(&product.id).await?;
        let quote = pricing_resolver
            .quote(&product, assignment.discount_percent, &fields)
            .await?;

        products.push(ProductSummary::from_parts(product, quote));
    }

    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

/// Get a single product with its form fields and resolved price.
///
/// # Endpoint
///
/// `GET /api/v1/products/{id}`
///
/// # Response
///
/// - **200 OK**: `{"success": true, "product": {...}}`
/// - **400**: Blank product id
/// - **401**: Invalid or missing token
/// - **404**: Product missing, inactive, or not assigned to this
///   client (one answer for all three, to avoid leaking the catalog)
/// - **429**: Hourly quota exhausted
/// - **500**: Store failure
///
/// # Resolution order
///
/// 1. Assignment lookup (is this product visible to this client, and
///    at what discount?)
/// 2. Product fetch, active check
/// 3. Field catalog resolution (merged overrides, validation patterns)
/// 4. Pricing resolution (static discounted base or dynamic range)
pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    if product_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("Product ID is required".to_string()));
    }

    let assignment = state
        .store
        .find_assignment(&auth.client_id, &product_id)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    let product = state
        .store
        .get_product(&product_id)
        .await?
        .filter(|p| p.active)
        .ok_or(AppError::ProductNotFound)?;

    let fields = FieldCatalogResolver::new(state.store.clone())
        .resolve(&product.id)
        .await?;
    let quote = PricingResolver::new(state.store.clone())
        .quote(&product, assignment.discount_percent, &fields)
        .await?;

    Ok(Json(ProductResponse {
        success: true,
        product: ProductDetail::from_parts(product, quote, fields),
    }))
}
