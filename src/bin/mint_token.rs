//! Administrative utility: provision a client and mint an access
//! token.
//!
//! Token and client lifecycle is deliberately outside the API surface;
//! this binary is that out-of-band path. The token value is printed
//! exactly once and stored as-is (lookup at request time is by exact
//! value).
//!
//! # Usage
//!
//! ```text
//! mint-token <client-name> <email> [rate-limit]
//! ```

use anyhow::Context;
use chrono::{Duration, Utc};
use uuid::Uuid;

use catalog_api::{
    db,
    models::{client::Client, token::generate_token, token::AccessToken},
    store::PgStore,
};

const USAGE: &str = "usage: mint-token <client-name> <email> [rate-limit]";

/// Minted tokens are valid this long before needing a re-issue.
const TOKEN_VALIDITY_DAYS: i64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let name = args.next().context(USAGE)?;
    let email = args.next().context(USAGE)?;
    let rate_limit: Option<i64> = args
        .next()
        .map(|v| v.parse())
        .transpose()
        .context("rate limit must be an integer")?;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    let now = Utc::now();
    let client = Client {
        id: Uuid::new_v4().to_string(),
        name: name.clone(),
        email,
        rate_limit,
        active: true,
        created_at: now,
    };
    store.create_client(&client).await?;

    let token = AccessToken {
        id: Uuid::new_v4().to_string(),
        token: generate_token(&name),
        client_id: client.id.clone(),
        expires_at: now + Duration::days(TOKEN_VALIDITY_DAYS),
        active: true,
        created_at: now,
    };
    store.create_access_token(&token).await?;

    println!("client id: {}", client.id);
    println!("token id:  {}", token.id);
    println!("expires:   {}", token.expires_at);
    println!("token:     {}  (shown once, store it now)", token.token);

    Ok(())
}
