//! Client model for third-party API consumers.
//!
//! A client is the owning principal behind one or more access tokens.
//! Every gated request is attributed to exactly one client, and the
//! client record carries the per-hour rate limit and active flag that
//! the access-decision gate enforces.

use chrono::{DateTime, Utc};

/// Hourly request limit applied when a client has no explicit limit.
pub const DEFAULT_RATE_LIMIT: i64 = 100;

/// Represents a client record from the store.
///
/// # Store Table
///
/// Maps to the `clients` table with columns:
/// - `id`: Opaque string identifier
/// - `name`: Human-readable client name
/// - `email`: Contact address
/// - `rate_limit`: Requests per hour, NULL means "use the default"
/// - `active`: Whether the client may currently access the API
/// - `created_at`: When the client was provisioned
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    /// Unique identifier for this client
    pub id: String,

    /// Human-readable client name
    pub name: String,

    /// Contact email address
    pub email: String,

    /// Configured requests-per-hour limit.
    ///
    /// `None` means no explicit limit was provisioned; callers apply
    /// [`DEFAULT_RATE_LIMIT`] in that case.
    pub rate_limit: Option<i64>,

    /// Whether this client is currently allowed to access the API.
    ///
    /// Inactive clients are denied at the gate even when they hold a
    /// valid token. This provides a revocation switch that does not
    /// require touching individual tokens.
    pub active: bool,

    /// Timestamp when this client was created
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Effective hourly request limit for this client.
    pub fn effective_rate_limit(&self) -> i64 {
        self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)
    }
}
