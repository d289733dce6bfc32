//! Partner catalog API.
//!
//! REST service granting third-party clients scoped, rate-limited
//! access to a catalog of priced products. Prices depend on per-client
//! discount tiers and, for products with a price-affecting select
//! field, on per-option price overrides.
//!
//! # Architecture
//!
//! - **Web framework**: Axum (async HTTP server)
//! - **Store**: PostgreSQL behind the [`store::RecordStore`] trait
//!   (an in-memory backend exists for tests)
//! - **Access gate**: bearer-token validation + hourly rate limiting
//!   as middleware on every product route
//! - **Format**: JSON responses, camelCase keys
//!
//! # Request flow
//!
//! inbound request → access gate (allow/deny + diagnostic context) →
//! product handler → field catalog resolver → pricing resolver →
//! JSON payload

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::store::RecordStore;

/// Shared application state: the lazily-shared, read-only store
/// handle. Constructed once at startup, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

/// Build the full application router.
///
/// Public routes (health) are mounted next to the gated product API.
/// Exported so the integration tests can drive the exact production
/// routing in-process.
pub fn build_router(state: AppState) -> Router {
    let gated_routes = Router::new()
        .route("/api/v1/products", get(handlers::products::list_products))
        .route(
            "/api/v1/products/{id}",
            get(handlers::products::get_product),
        )
        // Apply the access gate to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::access_gate,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(gated_routes)
        .with_state(state)
}
