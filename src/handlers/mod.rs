//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that receives request data,
//! drives the services, and returns a JSON response or an `AppError`.

/// Health check endpoint
pub mod health;
/// Product catalog endpoints
pub mod products;
