//! Access token model and token format helpers.
//!
//! Tokens are opaque bearer secrets in the form
//! `{prefix}_sk_{random32chars}` where the prefix is derived from the
//! owning client's name. Lookup at request time is by exact token
//! value, so the format helpers here are only used when minting tokens
//! and for offline sanity checks.

use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};

/// Represents an access token record from the store.
///
/// # Store Table
///
/// Maps to the `access_tokens` table. One active token is expected per
/// client at a time, but that is a provisioning concern - this core
/// simply uses the first active match.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessToken {
    /// Unique identifier for this token record
    pub id: String,

    /// The opaque secret presented by clients in the
    /// `Authorization: Bearer <token>` header.
    ///
    /// Never echoed back in any response or policy context.
    pub token: String,

    /// Client that owns this token
    pub client_id: String,

    /// Instant after which the token is rejected
    pub expires_at: DateTime<Utc>,

    /// Whether this token is currently valid.
    ///
    /// Inactive tokens are rejected during validation, which provides
    /// a way to revoke access without deleting the record.
    pub active: bool,

    /// Timestamp when this token was created
    pub created_at: DateTime<Utc>,
}

/// Generate a new access token for the named client.
///
/// Format: `{prefix}_sk_{random32chars}` where the prefix is the first
/// 2-3 lowercase alphanumeric characters of the client name and the
/// random part is 32 alphanumeric characters.
pub fn generate_token(client_name: &str) -> String {
    let prefix: String = client_name
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .collect();

    let random_part = Alphanumeric.sample_string(&mut rand::rng(), 32);

    format!("{prefix}_sk_{random_part}")
}

/// Check whether a string matches the minted token format.
///
/// Accepts a 2-3 character lowercase alphanumeric prefix, the literal
/// `_sk_` marker, and a 32 character alphanumeric secret.
pub fn is_valid_token_format(token: &str) -> bool {
    let Some((prefix, secret)) = token.split_once("_sk_") else {
        return false;
    };

    let prefix_ok = (2..=3).contains(&prefix.len())
        && prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let secret_ok = secret.len() == 32 && secret.chars().all(|c| c.is_ascii_alphanumeric());

    prefix_ok && secret_ok
}
