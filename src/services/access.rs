//! Access-decision engine.
//!
//! Composes the token validator and the rate limiter into a single
//! allow/deny policy with a flat string context map. The context is
//! intended for downstream propagation so read handlers can trust the
//! gate's work instead of re-validating the token.
//!
//! On allow the context carries `ownerId`, `tokenId`, `remaining`,
//! `resetAt` (ISO-8601) and `limit`. On a quota denial it carries
//! `remaining`, `resetAt` and `limitError`. A credential denial gets a
//! generic reason only - the token value itself never appears anywhere
//! in a policy.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::{
    services::{
        rate_limiter::{RateLimitOutcome, RateLimiter},
        token_validator::{TokenIdentity, TokenValidator},
    },
    store::{RecordStore, StoreError},
};

/// Policy effect for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// Decision produced by the gate for one request.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub effect: Effect,

    /// Authenticated client id, or `"unauthorized"` on a credential
    /// denial.
    pub principal_id: String,

    /// Opaque request-resource identifier, echoed back unchanged.
    pub resource: String,

    /// Flat key-value context for downstream handlers.
    pub context: HashMap<String, String>,
}

impl AccessPolicy {
    /// Whether this is a quota denial (as opposed to a credential one).
    pub fn is_rate_limited(&self) -> bool {
        self.context.contains_key("limitError")
    }

    /// ISO-8601 quota reset instant, when present.
    pub fn reset_at(&self) -> Option<&str> {
        self.context.get("resetAt").map(String::as_str)
    }

    fn deny(resource: &str) -> Self {
        let mut context = HashMap::new();
        context.insert("message".to_string(), "Access denied".to_string());

        Self {
            effect: Effect::Deny,
            principal_id: "unauthorized".to_string(),
            resource: resource.to_string(),
            context,
        }
    }

    fn rate_limited(identity: TokenIdentity, resource: &str, outcome: &RateLimitOutcome) -> Self {
        let mut context = HashMap::new();
        context.insert("remaining".to_string(), "0".to_string());
        context.insert("resetAt".to_string(), outcome.reset_at.to_rfc3339());
        context.insert("limitError".to_string(), "true".to_string());
        context.insert("message".to_string(), "Rate limit exceeded".to_string());

        Self {
            effect: Effect::Deny,
            principal_id: identity.client_id,
            resource: resource.to_string(),
            context,
        }
    }

    fn allow(
        identity: TokenIdentity,
        resource: &str,
        limit: i64,
        outcome: &RateLimitOutcome,
    ) -> Self {
        let mut context = HashMap::new();
        context.insert("ownerId".to_string(), identity.client_id.clone());
        context.insert("tokenId".to_string(), identity.token_id);
        context.insert("remaining".to_string(), outcome.remaining.to_string());
        context.insert("resetAt".to_string(), outcome.reset_at.to_rfc3339());
        context.insert("limit".to_string(), limit.to_string());
        context.insert("message".to_string(), "Access granted".to_string());

        Self {
            effect: Effect::Allow,
            principal_id: identity.client_id,
            resource: resource.to_string(),
            context,
        }
    }
}

/// Composes token validation, client status and rate limiting into one
/// decision.
pub struct AccessDecisionEngine {
    store: Arc<dyn RecordStore>,
    validator: TokenValidator,
    limiter: RateLimiter,
}

impl AccessDecisionEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            validator: TokenValidator::new(store.clone()),
            limiter: RateLimiter::new(store.clone()),
            store,
        }
    }

    /// Decide whether the request may proceed.
    ///
    /// `auth_header` is the raw `Authorization` header value, if any;
    /// `resource` is an opaque identifier echoed into the policy.
    ///
    /// Credential and quota denials are normal outcomes, not errors.
    /// Only a store failure during token validation or client lookup
    /// surfaces as `Err` (the rate limiter absorbs its own store
    /// failures by failing open).
    pub async fn decide(
        &self,
        auth_header: Option<&str>,
        resource: &str,
    ) -> Result<AccessPolicy, StoreError> {
        self.decide_at(auth_header, resource, Local::now()).await
    }

    async fn decide_at(
        &self,
        auth_header: Option<&str>,
        resource: &str,
        now: DateTime<Local>,
    ) -> Result<AccessPolicy, StoreError> {
        let token = auth_header
            .and_then(|header| header.strip_prefix("Bearer "))
            .unwrap_or("")
            .trim();

        let Some(identity) = self.validator.validate(token).await? else {
            return Ok(AccessPolicy::deny(resource));
        };

        let Some(client) = self.store.get_client(&identity.client_id).await? else {
            warn!(client_id = %identity.client_id, "valid token references a missing client");
            return Ok(AccessPolicy::deny(resource));
        };

        if !client.active {
            debug!(client_id = %client.id, "client is inactive");
            return Ok(AccessPolicy::deny(resource));
        }

        let limit = client.effective_rate_limit();
        let outcome = self.limiter.check_at(&identity.client_id, limit, now).await;

        if !outcome.allowed {
            debug!(client_id = %identity.client_id, "rate limit exceeded");
            return Ok(AccessPolicy::rate_limited(identity, resource, &outcome));
        }

        Ok(AccessPolicy::allow(identity, resource, limit, &outcome))
    }
}
