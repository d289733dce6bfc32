//! Access gate middleware.
//!
//! This middleware intercepts every gated request to:
//! 1. Run the access-decision engine (token validation, client status,
//!    rate limiting) against the `Authorization` header
//! 2. Inject the authenticated context into the request
//! 3. Reject denied requests with HTTP 401 (credential) or 429 (quota)
//! 4. Attach `x-ratelimit-*` headers to allowed responses

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, services::access::{AccessDecisionEngine, Effect}};

/// Authentication context attached to allowed requests.
///
/// Inserted into the request's extension map by the gate; route
/// handlers extract it to know which client made the request, without
/// re-validating the token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated client.
    ///
    /// Used to filter every store query (e.g. only products assigned
    /// to this client are visible).
    pub client_id: String,

    /// ID of the token record that authenticated this request
    pub token_id: String,
}

/// Access gate middleware function.
///
/// # Flow
///
/// 1. Read the raw `Authorization` header (the engine handles the
///    `Bearer ` prefix and all failure modes itself)
/// 2. `AccessDecisionEngine::decide` → allow/deny policy
/// 3. Deny with `limitError` → 429 carrying the reset instant;
///    any other deny → 401
/// 4. Allow → inject [`AuthContext`], call the next handler, then copy
///    the quota diagnostics onto the response as `x-ratelimit-*`
///    headers
///
/// A store failure inside the engine (other than rate limiting, which
/// fails open) surfaces as HTTP 500.
pub async fn access_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);
    let resource = request.uri().path().to_string();

    let engine = AccessDecisionEngine::new(state.store.clone());
    let policy = engine.decide(auth_header.as_deref(), &resource).await?;

    if policy.effect == Effect::Deny {
        if policy.is_rate_limited() {
            return Err(AppError::RateLimited {
                reset_at: policy.reset_at().unwrap_or_default().to_string(),
            });
        }
        return Err(AppError::InvalidToken);
    }

    request.extensions_mut().insert(AuthContext {
        client_id: policy.principal_id.clone(),
        token_id: policy
            .context
            .get("tokenId")
            .cloned()
            .unwrap_or_default(),
    });

    let mut response = next.run(request).await;

    for (context_key, header_name) in [
        ("limit", "x-ratelimit-limit"),
        ("remaining", "x-ratelimit-remaining"),
        ("resetAt", "x-ratelimit-reset"),
    ] {
        if let Some(value) = policy.context.get(context_key) {
            if let Ok(value) = HeaderValue::from_str(value) {
                response.headers_mut().insert(header_name, value);
            }
        }
    }

    Ok(response)
}
