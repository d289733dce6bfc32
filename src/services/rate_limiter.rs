//! Hourly rolling-window rate limiter.
//!
//! Enforces "at most N requests per client per clock hour". The window
//! is the top-of-the-hour boundary in the server's local time, not a
//! sliding 60-minute window from the first request: key
//! `{client_id}-{YYYY-MM-DD}-{HH}`, one counter row per window.
//!
//! # Failure policy
//!
//! A store error on either the read or the write fails **open**: the
//! request is allowed with `remaining = -1`. A broken rate limiter
//! must degrade quota enforcement, not availability.
//!
//! # Concurrency
//!
//! The counter read-then-write is not atomic. Two requests landing in
//! the same window can both observe the same pre-increment count and
//! both be allowed, so the effective limit can be exceeded by a small
//! margin under high concurrency. Accepted trade-off; switching to a
//! store-side conditional increment would change the availability
//! characteristics and is a deliberate decision to make, not a patch.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Timelike, Utc};
use tracing::warn;

use crate::{
    models::rate_counter::RateCounter,
    store::{RecordStore, StoreError},
};

/// Result of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,

    /// Requests left in the current window after this one.
    ///
    /// `0` on denial, `-1` when the limiter failed open and the true
    /// count is unknown.
    pub remaining: i64,

    /// When the current window ends and the quota resets.
    pub reset_at: DateTime<Local>,
}

impl RateLimitOutcome {
    fn fail_open(now: DateTime<Local>) -> Self {
        Self {
            allowed: true,
            remaining: -1,
            reset_at: now,
        }
    }
}

/// Counter window key for a client at a given instant.
pub fn window_key(client_id: &str, at: DateTime<Local>) -> String {
    format!("{client_id}-{}", at.format("%Y-%m-%d-%H"))
}

/// Hour-window portion of the key, `{YYYY-MM-DD}-{HH}`.
pub fn hour_window(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d-%H").to_string()
}

/// Start of the next clock hour after `at`.
pub fn next_hour_boundary(at: DateTime<Local>) -> DateTime<Local> {
    let next = at + Duration::hours(1);

    next.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(next)
}

/// Maintains per-client hourly request counters.
pub struct RateLimiter {
    store: Arc<dyn RecordStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Charge one request against the client's current hour window.
    ///
    /// Denials do not mutate the counter: a client sitting at the
    /// limit can keep retrying within the hour without being charged
    /// further quota.
    pub async fn check(&self, client_id: &str, limit: i64) -> RateLimitOutcome {
        self.check_at(client_id, limit, Local::now()).await
    }

    /// Same as [`check`](Self::check) with an explicit clock, so tests
    /// can pin the window.
    pub async fn check_at(
        &self,
        client_id: &str,
        limit: i64,
        now: DateTime<Local>,
    ) -> RateLimitOutcome {
        let key = window_key(client_id, now);
        let reset_at = next_hour_boundary(now);

        let counter = match self.store.get_counter(&key).await {
            Ok(counter) => counter,
            Err(error) => {
                warn!(%error, client_id, "rate limit read failed, failing open");
                return RateLimitOutcome::fail_open(now);
            }
        };

        let current_count = counter.as_ref().map_or(0, |c| c.request_count);

        if current_count >= limit {
            return RateLimitOutcome {
                allowed: false,
                remaining: 0,
                reset_at,
            };
        }

        // Retention horizon, not the window boundary
        let expires_at = now.with_timezone(&Utc) + Duration::hours(2);
        let write = match counter {
            Some(existing) => {
                self.store
                    .update_counter(&existing.id, current_count + 1, expires_at)
                    .await
            }
            None => {
                self.store
                    .create_counter(RateCounter {
                        id: key,
                        client_id: client_id.to_string(),
                        hour_window: hour_window(now),
                        request_count: 1,
                        expires_at,
                    })
                    .await
            }
        };

        if let Err(error) = write {
            warn!(%error, client_id, "rate limit write failed, failing open");
            return RateLimitOutcome::fail_open(now);
        }

        RateLimitOutcome {
            allowed: true,
            remaining: (limit - (current_count + 1)).max(0),
            reset_at,
        }
    }
}
