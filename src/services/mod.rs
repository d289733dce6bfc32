//! Business logic services.
//!
//! Services contain the core logic separated from HTTP handlers: the
//! access-decision gate (token validation, rate limiting, policy
//! composition) and the pricing-resolution engine (field catalog
//! merging and price computation).

pub mod access;
pub mod catalog;
pub mod pricing;
pub mod rate_limiter;
pub mod token_validator;
