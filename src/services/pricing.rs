//! Pricing resolution.
//!
//! Computes the price a specific client sees for a product: the
//! discounted base price, or a dynamic `"{min}-{max}"` range when the
//! product has a price-affecting select field whose options carry
//! per-option price overrides.
//!
//! All currency math is f64 rounded half-up to 2 decimals. Resolution
//! is read-only and idempotent: the same inputs always produce the
//! same quote.

use std::{collections::HashMap, sync::Arc};

use tracing::warn;

use crate::{
    models::{
        field::{FieldKind, PriceMode, ResolvedField},
        product::{PriceDisplay, PriceQuote, Product},
    },
    store::{RecordStore, StoreError},
};

/// Round to 2 decimal places, half-up.
///
/// Non-finite input collapses to 0. The scaled value is snapped to
/// strip binary representation noise before rounding, so decimal
/// midpoints land exactly on .5 cents (19.005 rounds to 19.01, not
/// down to 19.00).
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }

    let cents = (value * 100.0 * 1e8).round() / 1e8;

    cents.round() / 100.0
}

/// Apply a percentage discount to an amount: `amount * (1 - pct/100)`,
/// rounded to 2 decimals. Malformed (non-finite) results collapse to 0.
pub fn apply_discount(amount: f64, discount_percent: f64) -> f64 {
    round2(amount * (1.0 - discount_percent / 100.0))
}

/// Format a currency value: integral values render without decimals
/// (`"20"`), anything else with exactly 2 (`"19.50"`).
pub fn fmt_money(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Resolves client-specific product prices.
pub struct PricingResolver {
    store: Arc<dyn RecordStore>,
}

impl PricingResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Compute the quote for one product, client discount and resolved
    /// field catalog.
    ///
    /// A dynamic range is only emitted when the price-affecting field
    /// is a select with at least one option; in every other case the
    /// quote degrades to the static discounted base price. More than
    /// one price-affecting field is a data anomaly: logged, and the
    /// first by catalog order wins.
    pub async fn quote(
        &self,
        product: &Product,
        discount_percent: f64,
        catalog: &[ResolvedField],
    ) -> Result<PriceQuote, StoreError> {
        let discounted_base = apply_discount(product.base_price, discount_percent);
        let static_quote = PriceQuote {
            price: PriceDisplay::Amount(discounted_base),
            dynamic_price: false,
        };

        // The catalog is already sorted ascending by order, so "first"
        // here is "first by order"
        let mut pricing_fields = catalog.iter().filter(|f| f.affects_price);
        let Some(field) = pricing_fields.next() else {
            return Ok(static_quote);
        };
        if pricing_fields.next().is_some() {
            warn!(
                product_id = %product.id,
                "multiple price-affecting fields on one product, using the first by order"
            );
        }

        if field.field_type != FieldKind::Select || field.options.is_empty() {
            return Ok(static_quote);
        }

        let overrides = self.store.list_option_overrides(&field.link_id).await?;
        let by_option: HashMap<&str, (PriceMode, f64)> = overrides
            .iter()
            .map(|o| (o.option_id.as_str(), (o.mode, o.price)))
            .collect();

        let option_prices: Vec<f64> = field
            .options
            .iter()
            .map(|option| {
                let raw = match by_option.get(option.id.as_str()) {
                    Some((PriceMode::Set, price)) => *price,
                    Some((PriceMode::Add, price)) => product.base_price + price,
                    None => product.base_price,
                };

                apply_discount(raw, discount_percent)
            })
            .collect();

        // Guarded above, but an empty set must never panic the fold
        if option_prices.is_empty() {
            return Ok(static_quote);
        }

        let min = option_prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = option_prices
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(PriceQuote {
            price: PriceDisplay::Range(format!("{}-{}", fmt_money(min), fmt_money(max))),
            dynamic_price: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::field::{OptionPriceOverride, ResolvedOption},
        store::MemoryStore,
    };
    use chrono::Utc;

    #[test]
    fn discount_math_is_exact() {
        assert_eq!(apply_discount(100.0, 25.0), 75.00);
        assert_eq!(apply_discount(100.0, 0.0), 100.00);
        assert_eq!(apply_discount(0.0, 50.0), 0.00);
    }

    #[test]
    fn rounding_is_half_up_on_decimal_midpoints() {
        assert_eq!(round2(19.005), 19.01);
        assert_eq!(round2(19.004), 19.00);
        assert_eq!(round2(33.333333), 33.33);
    }

    #[test]
    fn non_finite_values_collapse_to_zero() {
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(f64::INFINITY), 0.0);
        assert_eq!(apply_discount(100.0, f64::NAN), 0.0);
    }

    #[test]
    fn money_formatting_drops_decimals_on_whole_values() {
        assert_eq!(fmt_money(20.0), "20");
        assert_eq!(fmt_money(19.5), "19.50");
        assert_eq!(fmt_money(0.0), "0");
        assert_eq!(fmt_money(40.25), "40.25");
    }

    fn product(base_price: f64) -> Product {
        Product {
            id: "P1".to_string(),
            name: "Gift card".to_string(),
            kind: "giftcard".to_string(),
            description: None,
            base_price,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn select_field(link_id: &str, option_ids: &[&str]) -> ResolvedField {
        ResolvedField {
            link_id: link_id.to_string(),
            field_name: "denomination".to_string(),
            field_type: FieldKind::Select,
            label: "Denomination".to_string(),
            placeholder: String::new(),
            is_required: true,
            order: 0,
            affects_price: true,
            validation_regex: "^.*$".to_string(),
            options: option_ids
                .iter()
                .map(|id| ResolvedOption {
                    id: id.to_string(),
                    label: id.to_string(),
                    value: id.to_string(),
                    order: 0,
                })
                .collect(),
        }
    }

    fn set_override(link_id: &str, option_id: &str, price: f64) -> OptionPriceOverride {
        OptionPriceOverride {
            id: format!("ov-{option_id}"),
            link_id: link_id.to_string(),
            product_id: "P1".to_string(),
            field_id: "F1".to_string(),
            option_id: option_id.to_string(),
            mode: PriceMode::Set,
            price,
        }
    }

    fn resolver() -> PricingResolver {
        PricingResolver::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn no_price_affecting_field_yields_the_discounted_base() {
        let quote = resolver().quote(&product(80.0), 25.0, &[]).await.unwrap();

        assert_eq!(quote.price, PriceDisplay::Amount(60.0));
        assert!(!quote.dynamic_price);
    }

    #[tokio::test]
    async fn non_select_price_field_degrades_to_static() {
        let mut field = select_field("L1", &[]);
        field.field_type = FieldKind::Number;
        let quote = resolver()
            .quote(&product(100.0), 0.0, &[field])
            .await
            .unwrap();

        assert_eq!(quote.price, PriceDisplay::Amount(100.0));
        assert!(!quote.dynamic_price);
    }

    #[tokio::test]
    async fn select_without_options_degrades_to_static() {
        let quote = resolver()
            .quote(&product(100.0), 10.0, &[select_field("L1", &[])])
            .await
            .unwrap();

        assert_eq!(quote.price, PriceDisplay::Amount(90.0));
        assert!(!quote.dynamic_price);
    }

    #[tokio::test]
    async fn overridden_options_produce_a_min_max_range() {
        let store = MemoryStore::new();
        store.put_override(set_override("L1", "O1", 55.0));
        store.put_override(set_override("L1", "O2", 40.0));
        store.put_override(set_override("L1", "O3", 70.0));
        let resolver = PricingResolver::new(Arc::new(store));

        let quote = resolver
            .quote(&product(100.0), 0.0, &[select_field("L1", &["O1", "O2", "O3"])])
            .await
            .unwrap();

        assert_eq!(quote.price, PriceDisplay::Range("40-70".to_string()));
        assert!(quote.dynamic_price);
    }

    #[tokio::test]
    async fn options_without_overrides_fall_back_to_the_base_price() {
        let store = MemoryStore::new();
        store.put_override(set_override("L1", "O1", 150.0));
        let resolver = PricingResolver::new(Arc::new(store));

        // O2 has no override, so it prices at the 100 base
        let quote = resolver
            .quote(&product(100.0), 0.0, &[select_field("L1", &["O1", "O2"])])
            .await
            .unwrap();

        assert_eq!(quote.price, PriceDisplay::Range("100-150".to_string()));
    }

    #[tokio::test]
    async fn add_mode_overrides_surcharge_the_base_price() {
        let store = MemoryStore::new();
        let mut surcharge = set_override("L1", "O1", 20.0);
        surcharge.mode = PriceMode::Add;
        store.put_override(surcharge);
        let resolver = PricingResolver::new(Arc::new(store));

        let quote = resolver
            .quote(&product(100.0), 50.0, &[select_field("L1", &["O1", "O2"])])
            .await
            .unwrap();

        // Raw prices {120, 100}, then the 50% discount
        assert_eq!(quote.price, PriceDisplay::Range("50-60".to_string()));
    }

    #[tokio::test]
    async fn the_discount_applies_to_every_option_price() {
        let store = MemoryStore::new();
        store.put_override(set_override("L1", "O1", 40.0));
        store.put_override(set_override("L1", "O2", 70.0));
        let resolver = PricingResolver::new(Arc::new(store));

        let quote = resolver
            .quote(&product(100.0), 50.0, &[select_field("L1", &["O1", "O2"])])
            .await
            .unwrap();

        assert_eq!(quote.price, PriceDisplay::Range("20-35".to_string()));
    }

    #[tokio::test]
    async fn fractional_range_bounds_render_with_two_decimals() {
        let store = MemoryStore::new();
        store.put_override(set_override("L1", "O1", 19.5));
        store.put_override(set_override("L1", "O2", 40.0));
        let resolver = PricingResolver::new(Arc::new(store));

        let quote = resolver
            .quote(&product(100.0), 0.0, &[select_field("L1", &["O1", "O2"])])
            .await
            .unwrap();

        assert_eq!(quote.price, PriceDisplay::Range("19.50-40".to_string()));
    }

    #[tokio::test]
    async fn the_first_price_affecting_field_wins_on_anomaly() {
        let store = MemoryStore::new();
        store.put_override(set_override("L1", "O1", 40.0));
        store.put_override(set_override("L2", "O1", 900.0));
        let resolver = PricingResolver::new(Arc::new(store));

        let catalog = [select_field("L1", &["O1"]), select_field("L2", &["O1"])];
        let quote = resolver.quote(&product(100.0), 0.0, &catalog).await.unwrap();

        assert_eq!(quote.price, PriceDisplay::Range("40-40".to_string()));
    }

    #[tokio::test]
    async fn quoting_is_idempotent() {
        let store = MemoryStore::new();
        store.put_override(set_override("L1", "O1", 40.0));
        let resolver = PricingResolver::new(Arc::new(store));
        let catalog = [select_field("L1", &["O1", "O2"])];

        let first = resolver.quote(&product(100.0), 10.0, &catalog).await.unwrap();
        let second = resolver.quote(&product(100.0), 10.0, &catalog).await.unwrap();

        assert_eq!(first, second);
    }
}
