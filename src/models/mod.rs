//! Data models representing store entities and API payloads.
//!
//! This module contains all data structures that map to store records,
//! plus the response types assembled for API clients.

/// Client (third-party API consumer) model
pub mod client;
/// Shared field definitions, per-product links and options
pub mod field;
/// Product catalog models and response payloads
pub mod product;
/// Hourly rate-limit counter model
pub mod rate_counter;
/// Access token model and token format helpers
pub mod token;
