//! PostgreSQL record store.
//!
//! Thin query layer over the connection pool. All queries are plain
//! `query_as` with bound parameters; filtering by client id happens
//! here so handlers can never forget the ownership filter.

use chrono::{DateTime, Utc};

use crate::{
    db::DbPool,
    models::{
        client::Client,
        field::{FieldDefinition, FieldOption, OptionPriceOverride, ProductFieldLink},
        product::{ClientProduct, Product},
        rate_counter::RateCounter,
        token::AccessToken,
    },
    store::{RecordStore, StoreFuture},
};

/// Production store backed by the shared PostgreSQL pool.
///
/// Cheap to clone; the pool handle is reference-counted and safe to
/// share across requests. Constructed once at startup and never
/// mutated afterwards.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a newly provisioned client.
    ///
    /// Administrative path, used by the `mint-token` binary rather
    /// than any request handler.
    pub async fn create_client(&self, client: &Client) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, email, rate_limit, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(client.rate_limit)
        .bind(client.active)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a newly minted access token.
    pub async fn create_access_token(&self, token: &AccessToken) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (id, token, client_id, expires_at, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&token.id)
        .bind(&token.token)
        .bind(&token.client_id)
        .bind(token.expires_at)
        .bind(token.active)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl RecordStore for PgStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;

            Ok(())
        })
    }

    fn find_active_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<AccessToken>> {
        Box::pin(async move {
            // Exact-value equality; the LIMIT 1 makes "first match
            // wins" explicit should provisioning ever duplicate a value
            let record = sqlx::query_as::<_, AccessToken>(
                r#"
                SELECT id, token, client_id, expires_at, active, created_at
                FROM access_tokens
                WHERE token = $1 AND active = TRUE
                LIMIT 1
                "#,
            )
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

            Ok(record)
        })
    }

    fn get_client<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Client>> {
        Box::pin(async move {
            let client = sqlx::query_as::<_, Client>(
                "SELECT id, name, email, rate_limit, active, created_at FROM clients WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(client)
        })
    }

    fn get_counter<'a>(&'a self, window_key: &'a str) -> StoreFuture<'a, Option<RateCounter>> {
        Box::pin(async move {
            let counter = sqlx::query_as::<_, RateCounter>(
                r#"
                SELECT id, client_id, hour_window, request_count, expires_at
                FROM rate_counters
                WHERE id = $1
                "#,
            )
            .bind(window_key)
            .fetch_optional(&self.pool)
            .await?;

            Ok(counter)
        })
    }

    fn create_counter(&self, counter: RateCounter) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO rate_counters (id, client_id, hour_window, request_count, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&counter.id)
            .bind(&counter.client_id)
            .bind(&counter.hour_window)
            .bind(counter.request_count)
            .bind(counter.expires_at)
            .execute(&self.pool)
            .await?;

            Ok(())
        })
    }

    fn update_counter<'a>(
        &'a self,
        window_key: &'a str,
        request_count: i64,
        expires_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                "UPDATE rate_counters SET request_count = $2, expires_at = $3 WHERE id = $1",
            )
            .bind(window_key)
            .bind(request_count)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

            Ok(())
        })
    }

    fn get_product<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Product>> {
        Box::pin(async move {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, kind, description, base_price, active, created_at
                FROM products
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(product)
        })
    }

    fn find_assignment<'a>(
        &'a self,
        client_id: &'a str,
        product_id: &'a str,
    ) -> StoreFuture<'a, Option<ClientProduct>> {
        Box::pin(async move {
            let assignment = sqlx::query_as::<_, ClientProduct>(
                r#"
                SELECT id, client_id, product_id, discount_percent
                FROM client_products
                WHERE client_id = $1 AND product_id = $2
                LIMIT 1
                "#,
            )
            .bind(client_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(assignment)
        })
    }

    fn list_assignments<'a>(&'a self, client_id: &'a str) -> StoreFuture<'a, Vec<ClientProduct>> {
        Box::pin(async move {
            let assignments = sqlx::query_as::<_, ClientProduct>(
                r#"
                SELECT id, client_id, product_id, discount_percent
                FROM client_products
                WHERE client_id = $1
                "#,
            )
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;

            Ok(assignments)
        })
    }

    fn list_field_links<'a>(
        &'a self,
        product_id: &'a str,
    ) -> StoreFuture<'a, Vec<ProductFieldLink>> {
        Box::pin(async move {
            let links = sqlx::query_as::<_, ProductFieldLink>(
                r#"
                SELECT id, product_id, field_id, required, label, placeholder,
                       field_order, affects_price
                FROM product_field_links
                WHERE product_id = $1
                "#,
            )
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

            Ok(links)
        })
    }

    fn get_field<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<FieldDefinition>> {
        Box::pin(async move {
            let field = sqlx::query_as::<_, FieldDefinition>(
                "SELECT id, name, kind, validation_regex FROM field_definitions WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            Ok(field)
        })
    }

    fn list_field_options<'a>(&'a self, field_id: &'a str) -> StoreFuture<'a, Vec<FieldOption>> {
        Box::pin(async move {
            let options = sqlx::query_as::<_, FieldOption>(
                r#"
                SELECT id, field_id, label, value, option_order
                FROM field_options
                WHERE field_id = $1
                "#,
            )
            .bind(field_id)
            .fetch_all(&self.pool)
            .await?;

            Ok(options)
        })
    }

    fn list_option_overrides<'a>(
        &'a self,
        link_id: &'a str,
    ) -> StoreFuture<'a, Vec<OptionPriceOverride>> {
        Box::pin(async move {
            let overrides = sqlx::query_as::<_, OptionPriceOverride>(
                r#"
                SELECT id, link_id, product_id, field_id, option_id, mode, price
                FROM option_price_overrides
                WHERE link_id = $1
                "#,
            )
            .bind(link_id)
            .fetch_all(&self.pool)
            .await?;

            Ok(overrides)
        })
    }
}
