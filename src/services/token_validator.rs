//! Bearer token validation.
//!
//! Resolves a presented token value to an active, non-expired
//! ownership record. Fails closed: anything other than a live match
//! yields "invalid", and the caller receives no detail about why.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::store::{RecordStore, StoreError};

/// Identifiers attached to a successfully validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    /// Client that owns the token
    pub client_id: String,
    /// The token record's own id (never the secret value)
    pub token_id: String,
}

/// Resolves bearer tokens against the record store.
pub struct TokenValidator {
    store: Arc<dyn RecordStore>,
}

impl TokenValidator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate a raw bearer token value (scheme prefix already
    /// stripped).
    ///
    /// Returns `Ok(None)` for empty input, for no matching active
    /// record, or for an expired record. Lookup is exact-value
    /// equality against active records; if provisioning ever yields
    /// duplicates, the first store match wins. Reads only, never
    /// mutates state.
    ///
    /// # Errors
    ///
    /// A store failure propagates as [`StoreError`] - unlike rate
    /// limiting, token validation never fails open.
    pub async fn validate(&self, raw_token: &str) -> Result<Option<TokenIdentity>, StoreError> {
        let token = raw_token.trim();
        if token.is_empty() {
            debug!("no token provided");
            return Ok(None);
        }

        let Some(record) = self.store.find_active_token(token).await? else {
            debug!("token not found or inactive");
            return Ok(None);
        };

        if record.expires_at <= Utc::now() {
            debug!(token_id = %record.id, "token expired");
            return Ok(None);
        }

        Ok(Some(TokenIdentity {
            client_id: record.client_id,
            token_id: record.id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::token::AccessToken, store::MemoryStore};
    use chrono::Duration;

    fn token(value: &str, active: bool, expires_in: Duration) -> AccessToken {
        AccessToken {
            id: format!("tok-{value}"),
            token: value.to_string(),
            client_id: "client-1".to_string(),
            expires_at: Utc::now() + expires_in,
            active,
            created_at: Utc::now(),
        }
    }

    fn validator_with(tokens: Vec<AccessToken>) -> TokenValidator {
        let store = MemoryStore::new();
        for t in tokens {
            store.put_token(t);
        }
        TokenValidator::new(Arc::new(store))
    }

    #[tokio::test]
    async fn empty_and_whitespace_input_is_invalid() {
        let validator = validator_with(vec![]);

        assert_eq!(validator.validate("").await.unwrap(), None);
        assert_eq!(validator.validate("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = validator_with(vec![token("abc_sk_x", true, Duration::hours(1))]);

        assert_eq!(validator.validate("other_sk_y").await.unwrap(), None);
    }

    #[tokio::test]
    async fn inactive_token_is_invalid() {
        let validator = validator_with(vec![token("abc_sk_x", false, Duration::hours(1))]);

        assert_eq!(validator.validate("abc_sk_x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_token_is_invalid() {
        let validator = validator_with(vec![token("abc_sk_x", true, Duration::hours(-1))]);

        assert_eq!(validator.validate("abc_sk_x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn live_token_resolves_to_its_owner() {
        let validator = validator_with(vec![token("abc_sk_x", true, Duration::hours(1))]);

        let identity = validator.validate("abc_sk_x").await.unwrap();

        assert_eq!(
            identity,
            Some(TokenIdentity {
                client_id: "client-1".to_string(),
                token_id: "tok-abc_sk_x".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_trimmed() {
        let validator = validator_with(vec![token("abc_sk_x", true, Duration::hours(1))]);

        assert!(validator.validate(" abc_sk_x ").await.unwrap().is_some());
    }
}
