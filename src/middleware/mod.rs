//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers. The only
//! one here is the access gate, which authenticates and rate-limits
//! every request to the product API.

/// Access-decision gate middleware
pub mod auth;
