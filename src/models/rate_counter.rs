//! Hourly rate-limit counter model.

use chrono::{DateTime, Utc};

/// One request counter row per client per clock hour.
///
/// The primary key is the window key `{client_id}-{YYYY-MM-DD}-{HH}`,
/// so a row is only ever read or written inside its own hour window.
/// Rows are created lazily on the first allowed request of a window,
/// incremented on every further allowed request, and simply abandoned
/// once `expires_at` passes - there is no cleanup path in this core.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RateCounter {
    /// Window key, `{client_id}-{YYYY-MM-DD}-{HH}`
    pub id: String,

    /// Owning client
    pub client_id: String,

    /// Hour window portion of the key, `{YYYY-MM-DD}-{HH}`
    pub hour_window: String,

    /// Requests allowed so far in this window
    pub request_count: i64,

    /// Retention horizon, roughly two hours after the last write
    pub expires_at: DateTime<Utc>,
}
