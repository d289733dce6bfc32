//! In-memory record store.
//!
//! Backs the test suite and local experimentation. Entities live in
//! plain maps and vectors behind an `RwLock`; scan methods preserve
//! insertion order, which stands in for the backend's natural return
//! order in stable-sort assertions.

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::{DateTime, Utc};

use crate::{
    models::{
        client::Client,
        field::{FieldDefinition, FieldOption, OptionPriceOverride, ProductFieldLink},
        product::{ClientProduct, Product},
        rate_counter::RateCounter,
        token::AccessToken,
    },
    store::{RecordStore, StoreError, StoreFuture},
};

#[derive(Default)]
struct Inner {
    clients: HashMap<String, Client>,
    tokens: Vec<AccessToken>,
    counters: HashMap<String, RateCounter>,
    products: HashMap<String, Product>,
    assignments: Vec<ClientProduct>,
    fields: HashMap<String, FieldDefinition>,
    field_links: Vec<ProductFieldLink>,
    options: Vec<FieldOption>,
    overrides: Vec<OptionPriceOverride>,
}

/// Record store holding everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Backend {
            message: "memory store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Backend {
            message: "memory store lock poisoned".to_string(),
        })
    }

    // Fixture helpers. These bypass the trait on purpose: arranging
    // records is a provisioning concern the request path never has.

    pub fn put_client(&self, client: Client) {
        if let Ok(mut inner) = self.inner.write() {
            inner.clients.insert(client.id.clone(), client);
        }
    }

    pub fn put_token(&self, token: AccessToken) {
        if let Ok(mut inner) = self.inner.write() {
            inner.tokens.push(token);
        }
    }

    pub fn put_counter(&self, counter: RateCounter) {
        if let Ok(mut inner) = self.inner.write() {
            inner.counters.insert(counter.id.clone(), counter);
        }
    }

    pub fn put_product(&self, product: Product) {
        if let Ok(mut inner) = self.inner.write() {
            inner.products.insert(product.id.clone(), product);
        }
    }

    pub fn put_assignment(&self, assignment: ClientProduct) {
        if let Ok(mut inner) = self.inner.write() {
            inner.assignments.push(assignment);
        }
    }

    pub fn put_field(&self, field: FieldDefinition) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fields.insert(field.id.clone(), field);
        }
    }

    pub fn put_field_link(&self, link: ProductFieldLink) {
        if let Ok(mut inner) = self.inner.write() {
            inner.field_links.push(link);
        }
    }

    pub fn put_option(&self, option: FieldOption) {
        if let Ok(mut inner) = self.inner.write() {
            inner.options.push(option);
        }
    }

    pub fn put_override(&self, price_override: OptionPriceOverride) {
        if let Ok(mut inner) = self.inner.write() {
            inner.overrides.push(price_override);
        }
    }

    /// Current counter row for a window key, for test inspection.
    pub fn counter(&self, window_key: &str) -> Option<RateCounter> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.counters.get(window_key).cloned())
    }
}

impl RecordStore for MemoryStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.read().map(|_| ()) })
    }

    fn find_active_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<AccessToken>> {
        Box::pin(async move {
            let inner = self.read()?;

            Ok(inner
                .tokens
                .iter()
                .find(|t| t.token == token && t.active)
                .cloned())
        })
    }

    fn get_client<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Client>> {
        Box::pin(async move { Ok(self.read()?.clients.get(id).cloned()) })
    }

    fn get_counter<'a>(&'a self, window_key: &'a str) -> StoreFuture<'a, Option<RateCounter>> {
        Box::pin(async move { Ok(self.read()?.counters.get(window_key).cloned()) })
    }

    fn create_counter(&self, counter: RateCounter) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.write()?.counters.insert(counter.id.clone(), counter);

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
            let mut inner = self.write()?;

            if let Some(counter) = inner.counters.get_mut(window_key) {
                counter.request_count = request_count;
                counter.expires_at = expires_at;
            }

            Ok(())
        })
    }

    fn get_product<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Product>> {
        Box::pin(async move { Ok(self.read()?.products.get(id).cloned()) })
    }

    fn find_assignment<'a>(
        &'a self,
        client_id: &'a str,
        product_id: &'a str,
    ) -> StoreFuture<'a, Option<ClientProduct>> {
        Box::pin(async move {
            let inner = self.read()?;

            Ok(inner
                .assignments
                .iter()
                .find(|a| a.client_id == client_id && a.product_id == product_id)
                .cloned())
        })
    }

    fn list_assignments<'a>(&'a self, client_id: &'a str) -> StoreFuture<'a, Vec<ClientProduct>> {
        Box::pin(async move {
            let inner = self.read()?;

            Ok(inner
                .assignments
                .iter()
                .filter(|a| a.client_id == client_id)
                .cloned()
                .collect())
        })
    }

    fn list_field_links<'a>(
        &'a self,
        product_id: &'a str,
    ) -> StoreFuture<'a, Vec<ProductFieldLink>> {
        Box::pin(async move {
            let inner = self.read()?;

            Ok(inner
                .field_links
                .iter()
                .filter(|l| l.product_id == product_id)
                .cloned()
                .collect())
        })
    }

    fn get_field<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<FieldDefinition>> {
        Box::pin(async move { Ok(self.read()?.fields.get(id).cloned()) })
    }

    fn list_field_options<'a>(&'a self, field_id: &'a str) -> StoreFuture<'a, Vec<FieldOption>> {
        Box::pin(async move {
            let inner = self.read()?;

            Ok(inner
                .options
                .iter()
                .filter(|o| o.field_id == field_id)
                .cloned()
                .collect())
        })
    }

    fn list_option_overrides<'a>(
        &'a self,
        link_id: &'a str,
    ) -> StoreFuture<'a, Vec<OptionPriceOverride>> {
        Box::pin(async move {
            let inner = self.read()?;

            Ok(inner
                .overrides
                .iter()
                .filter(|o| o.link_id == link_id)
                .cloned()
                .collect())
        })
    }
}
