//! Product catalog models and API response types.
//!
//! This module defines:
//! - `Product`: Store entity for a priced catalog item
//! - `ClientProduct`: Assignment of a product to a client with a discount
//! - `PriceDisplay` / `PriceQuote`: The resolved price of a product for
//!   a specific client (single value or dynamic range)
//! - `ProductSummary` / `ProductDetail`: Response bodies

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::field::ResolvedField;

/// Represents a product record from the store.
///
/// Prices are stored in the smallest stable currency unit with
/// 2-decimal precision. The price a client actually sees is always
/// computed per request from the base price, the client's discount and
/// any option price overrides - never persisted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    /// Unique identifier for this product
    pub id: String,

    /// Display name
    pub name: String,

    /// Product category (free-form, e.g. "giftcard")
    pub kind: String,

    /// Optional long description
    pub description: Option<String>,

    /// Undiscounted price
    pub base_price: f64,

    /// Inactive products are hidden from all clients
    pub active: bool,

    /// Timestamp when this product was created
    pub created_at: DateTime<Utc>,
}

/// Assignment of a product to a client.
///
/// Defines which products a client may see and at what discount.
/// A product without an assignment row is invisible to that client
/// (requests return 404, not 403, to avoid leaking catalog contents).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientProduct {
    pub id: String,
    pub client_id: String,
    pub product_id: String,

    /// Discount applied to every price shown to this client (0-100)
    pub discount_percent: f64,
}

/// A resolved price value as serialized to clients.
///
/// Either a plain discounted amount or a formatted `"{min}-{max}"`
/// range when the price depends on a selectable option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PriceDisplay {
    Amount(f64),
    Range(String),
}

/// Outcome of pricing resolution for one product and one client.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: PriceDisplay,
    pub dynamic_price: bool,
}

/// Product list entry returned by `GET /api/v1/products`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub price: PriceDisplay,
    pub dynamic_price: bool,
}

/// Full product payload returned by `GET /api/v1/products/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub price: PriceDisplay,
    pub dynamic_price: bool,
    pub form_fields: Vec<ResolvedField>,
}

impl ProductSummary {
    /// Assemble a list entry from the entity and its resolved quote.
    pub fn from_parts(product: Product, quote: PriceQuote) -> Self {
        Self {
            id: product.id,
            name: product.name,
            kind: product.kind,
            description: product.description,
            price: quote.price,
            dynamic_price: quote.dynamic_price,
        }
    }
}

impl ProductDetail {
    /// Assemble the detail payload from the entity, its resolved quote
    /// and the resolved field catalog.
    pub fn from_parts(product: Product, quote: PriceQuote, form_fields: Vec<ResolvedField>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            kind: product.kind,
            description: product.description,
            price: quote.price,
            dynamic_price: quote.dynamic_price,
            form_fields,
        }
    }
}

/// Envelope for the product list endpoint.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<ProductSummary>,
}

/// Envelope for the product detail endpoint.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: ProductDetail,
}
