//! Record-store contract and backends.
//!
//! All components consume the store through the [`RecordStore`] trait:
//! point lookups, equality-filtered scans, and the two counter write
//! operations the rate limiter needs. The production backend is
//! PostgreSQL ([`PgStore`]); an in-memory backend ([`MemoryStore`])
//! backs the test suite.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::{future::Future, pin::Pin};

use chrono::{DateTime, Utc};

use crate::models::{
    client::Client,
    field::{FieldDefinition, FieldOption, OptionPriceOverride, ProductFieldLink},
    product::{ClientProduct, Product},
    rate_counter::RateCounter,
    token::AccessToken,
};

/// Boxed future returned by [`RecordStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Error type produced by [`RecordStore`] implementations.
///
/// Deliberately opaque: callers only decide whether to propagate
/// (HTTP 500) or absorb (rate-limiter fail-open), never branch on the
/// backend detail. Messages never contain token values.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backend-level failure for the storage engine.
    #[error("store backend failure: {message}")]
    Backend { message: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Backend {
            message: error.to_string(),
        }
    }
}

/// Storage contract consumed by the gate and the pricing engine.
///
/// Read operations are point lookups by id or equality-filtered scans.
/// The only writes are the rate-counter create/update pair; the
/// read-then-write sequence around them is intentionally not atomic
/// (see the rate limiter for the documented trade-off).
pub trait RecordStore: Send + Sync {
    /// Cheap connectivity probe for health checks.
    fn ping(&self) -> StoreFuture<'_, ()>;

    /// Finds the first active token record with the exact given value.
    fn find_active_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<AccessToken>>;

    /// Fetches a client by id.
    fn get_client<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Client>>;

    /// Fetches the rate counter for a window key, if present.
    fn get_counter<'a>(&'a self, window_key: &'a str) -> StoreFuture<'a, Option<RateCounter>>;

    /// Creates a fresh counter row for a window.
    fn create_counter(&self, counter: RateCounter) -> StoreFuture<'_, ()>;

    /// Overwrites a counter's count and expiry.
    ///
    /// The count is an absolute value computed by the caller, not a
    /// stored-side increment.
    fn update_counter<'a>(
        &'a self,
        window_key: &'a str,
        request_count: i64,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;

    /// Fetches a product by id.
    fn get_product<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Product>>;

    /// Finds the assignment of a product to a client, if any.
    fn find_assignment<'a>(
        &'a self,
        client_id: &'a str,
        product_id: &'a str,
    ) -> StoreFuture<'a, Option<ClientProduct>>;

    /// Lists all product assignments for a client.
    fn list_assignments<'a>(&'a self, client_id: &'a str) -> StoreFuture<'a, Vec<ClientProduct>>;

    /// Lists the field links attached to a product.
    fn list_field_links<'a>(
        &'a self,
        product_id: &'a str,
    ) -> StoreFuture<'a, Vec<ProductFieldLink>>;

    /// Fetches a shared field definition by id.
    fn get_field<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<FieldDefinition>>;

    /// Lists the options of a field.
    fn list_field_options<'a>(&'a self, field_id: &'a str) -> StoreFuture<'a, Vec<FieldOption>>;

    /// Lists the per-option price overrides anchored to a field link.
    fn list_option_overrides<'a>(
        &'a self,
        link_id: &'a str,
    ) -> StoreFuture<'a, Vec<OptionPriceOverride>>;
}
