//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are
//! converted into HTTP responses with appropriate status codes and
//! JSON bodies.
//!
//! Note the asymmetry with the access gate: credential and quota
//! denials are normal policy outcomes inside the gate, and only become
//! `AppError` values at the HTTP edge when a response must be written.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Backing store failed during token validation, client lookup,
    /// catalog resolution or pricing.
    ///
    /// Returns HTTP 500. The store's message is surfaced for
    /// diagnostics; store errors never contain token values. Store
    /// failures confined to rate limiting never reach this variant -
    /// the limiter absorbs them by failing open.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Bearer token is missing, malformed, expired or revoked, or the
    /// owning client is inactive.
    ///
    /// Returns HTTP 401. Deliberately carries no detail about which
    /// check failed.
    #[error("Invalid or expired access token")]
    InvalidToken,

    /// The client exhausted its hourly request quota.
    ///
    /// Returns HTTP 429 with the window reset instant.
    #[error("Rate limit exceeded")]
    RateLimited {
        /// ISO-8601 instant when the current window ends
        reset_at: String,
    },

    /// Requested product does not exist, is inactive, or is not
    /// assigned to the authenticated client.
    ///
    /// Returns HTTP 404. One message for all three cases so clients
    /// cannot probe the catalog for unassigned products.
    #[error("Product not found")]
    ProductNotFound,

    /// Request parameters are invalid (e.g. a blank product id).
    ///
    /// Returns HTTP 400 with details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "success": false,
///   "error": "Not Found",
///   "message": "Human-readable error message"
/// }
/// ```
/// A 429 additionally carries `resetAt`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Invalid or missing access token".to_string(),
            ),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too Many Requests",
                "Rate limit exceeded".to_string(),
            ),
            AppError::ProductNotFound => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "Product not found or not assigned to this client".to_string(),
            ),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg.clone()),
            AppError::Store(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                source.to_string(),
            ),
        };

        let mut body = json!({
            "success": false,
            "error": error,
            "message": message,
        });

        if let AppError::RateLimited { reset_at } = &self {
            body["resetAt"] = json!(reset_at);
        }

        (status, Json(body)).into_response()
    }
}
