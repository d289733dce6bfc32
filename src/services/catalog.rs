//! Field catalog resolution.
//!
//! Builds the ordered list of data-entry fields for a product by
//! merging per-product link overrides onto the shared field
//! definitions, and always fills in a validation pattern: the explicit
//! one from the definition, or a default inferred from the field's
//! type and name.

use std::sync::Arc;

use tracing::warn;

use crate::{
    models::field::{FieldKind, ResolvedField, ResolvedOption},
    store::{RecordStore, StoreError},
};

const PATTERN_ANY: &str = "^.*$";
const PATTERN_NUMBER: &str = r"^-?\d+(\.\d+)?$";
const PATTERN_DATE: &str = r"^\d{4}-\d{2}-\d{2}$";
const PATTERN_EMAIL: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PATTERN_PHONE: &str = r"^\+?[\d\s\-().]{7,20}$";
const PATTERN_NAME: &str = r"^[A-Za-z][A-Za-z .'-]{0,99}$";

/// Default validation pattern for a field without an explicit one.
///
/// Resolution order: numeric and date types get a type-shaped pattern;
/// otherwise the field name is scanned (case-insensitively) for
/// "email", "phone" or "name"; anything else accepts any value.
fn default_pattern(kind: FieldKind, field_name: &str) -> &'static str {
    match kind {
        FieldKind::Number => PATTERN_NUMBER,
        FieldKind::Date => PATTERN_DATE,
        _ => {
            let name = field_name.to_lowercase();
            if name.contains("email") {
                PATTERN_EMAIL
            } else if name.contains("phone") {
                PATTERN_PHONE
            } else if name.contains("name") {
                PATTERN_NAME
            } else {
                PATTERN_ANY
            }
        }
    }
}

/// Resolves the per-product field catalog.
pub struct FieldCatalogResolver {
    store: Arc<dyn RecordStore>,
}

impl FieldCatalogResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolve the ordered field descriptors for a product.
    ///
    /// Fields sort ascending by the per-product order override
    /// (unset sorts as 0); ties keep store-return order. Select fields
    /// carry their ordered options. Price information is deliberately
    /// absent here - that is the pricing resolver's concern.
    pub async fn resolve(&self, product_id: &str) -> Result<Vec<ResolvedField>, StoreError> {
        let links = self.store.list_field_links(product_id).await?;
        let mut fields = Vec::with_capacity(links.len());

        for link in links {
            let Some(definition) = self.store.get_field(&link.field_id).await? else {
                warn!(
                    link_id = %link.id,
                    field_id = %link.field_id,
                    "field link references a missing definition, skipping"
                );
                continue;
            };

            let options = if definition.kind == FieldKind::Select {
                let mut options = self.store.list_field_options(&definition.id).await?;
                options.sort_by_key(|o| o.option_order.unwrap_or(0));

                options
                    .into_iter()
                    .map(|o| ResolvedOption {
                        id: o.id,
                        label: o.label,
                        value: o.value,
                        order: o.option_order.unwrap_or(0),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            let validation_regex = definition
                .validation_regex
                .clone()
                .unwrap_or_else(|| default_pattern(definition.kind, &definition.name).to_string());

            fields.push(ResolvedField {
                link_id: link.id,
                label: link.label.unwrap_or_else(|| definition.name.clone()),
                placeholder: link.placeholder.unwrap_or_default(),
                is_required: link.required,
                order: link.field_order.unwrap_or(0),
                affects_price: link.affects_price,
                field_name: definition.name,
                field_type: definition.kind,
                validation_regex,
                options,
            });
        }

        // Stable: ties keep the store's return order
        fields.sort_by_key(|f| f.order);

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::field::{FieldDefinition, FieldOption, ProductFieldLink},
        store::MemoryStore,
    };

    fn field(id: &str, name: &str, kind: FieldKind, regex: Option<&str>) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            validation_regex: regex.map(str::to_string),
        }
    }

    fn link(id: &str, field_id: &str, order: Option<i64>) -> ProductFieldLink {
        ProductFieldLink {
            id: id.to_string(),
            product_id: "P1".to_string(),
            field_id: field_id.to_string(),
            required: true,
            label: None,
            placeholder: None,
            field_order: order,
            affects_price: false,
        }
    }

    #[tokio::test]
    async fn overrides_merge_onto_the_shared_definition() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "recipient", FieldKind::String, None));
        store.put_field_link(ProductFieldLink {
            label: Some("Recipient name".to_string()),
            placeholder: Some("Jane Doe".to_string()),
            required: false,
            ..link("L1", "F1", Some(3))
        });
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let fields = resolver.resolve("P1").await.unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].label, "Recipient name");
        assert_eq!(fields[0].placeholder, "Jane Doe");
        assert!(!fields[0].is_required);
        assert_eq!(fields[0].order, 3);
        assert_eq!(fields[0].field_name, "recipient");
    }

    #[tokio::test]
    async fn label_falls_back_to_the_field_name() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "quantity", FieldKind::Number, None));
        store.put_field_link(link("L1", "F1", None));
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let fields = resolver.resolve("P1").await.unwrap();

        assert_eq!(fields[0].label, "quantity");
        assert_eq!(fields[0].placeholder, "");
        assert_eq!(fields[0].order, 0);
    }

    #[tokio::test]
    async fn fields_sort_by_order_with_stable_ties() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "third", FieldKind::String, None));
        store.put_field(field("F2", "first", FieldKind::String, None));
        store.put_field(field("F3", "second_a", FieldKind::String, None));
        store.put_field(field("F4", "second_b", FieldKind::String, None));
        store.put_field_link(link("L1", "F1", Some(9)));
        store.put_field_link(link("L2", "F2", None));
        store.put_field_link(link("L3", "F3", Some(5)));
        store.put_field_link(link("L4", "F4", Some(5)));
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let names: Vec<String> = resolver
            .resolve("P1")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.field_name)
            .collect();

        assert_eq!(names, ["first", "second_a", "second_b", "third"]);
    }

    #[tokio::test]
    async fn explicit_pattern_wins_over_inference() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "email", FieldKind::String, Some("^custom$")));
        store.put_field_link(link("L1", "F1", None));
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let fields = resolver.resolve("P1").await.unwrap();

        assert_eq!(fields[0].validation_regex, "^custom$");
    }

    #[tokio::test]
    async fn patterns_are_inferred_from_type_then_name() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "amount", FieldKind::Number, None));
        store.put_field(field("F2", "delivery_date", FieldKind::Date, None));
        store.put_field(field("F3", "Contact_Email", FieldKind::String, None));
        store.put_field(field("F4", "phone_number", FieldKind::String, None));
        store.put_field(field("F5", "recipient_name", FieldKind::String, None));
        store.put_field(field("F6", "notes", FieldKind::String, None));
        for (i, field_id) in ["F1", "F2", "F3", "F4", "F5", "F6"].iter().enumerate() {
            store.put_field_link(link(&format!("L{i}"), field_id, Some(i as i64)));
        }
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let patterns: Vec<String> = resolver
            .resolve("P1")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.validation_regex)
            .collect();

        assert_eq!(
            patterns,
            [
                PATTERN_NUMBER,
                PATTERN_DATE,
                PATTERN_EMAIL,
                PATTERN_PHONE,
                PATTERN_NAME,
                PATTERN_ANY,
            ]
        );
    }

    #[tokio::test]
    async fn select_fields_carry_their_options_in_order() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "denomination", FieldKind::Select, None));
        store.put_field_link(link("L1", "F1", None));
        store.put_option(FieldOption {
            id: "O2".to_string(),
            field_id: "F1".to_string(),
            label: "Large".to_string(),
            value: "100".to_string(),
            option_order: Some(2),
        });
        store.put_option(FieldOption {
            id: "O1".to_string(),
            field_id: "F1".to_string(),
            label: "Small".to_string(),
            value: "25".to_string(),
            option_order: Some(1),
        });
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let fields = resolver.resolve("P1").await.unwrap();

        let values: Vec<&str> = fields[0].options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["25", "100"]);
    }

    #[tokio::test]
    async fn non_select_fields_have_no_options() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "notes", FieldKind::String, None));
        store.put_field_link(link("L1", "F1", None));
        // Options on a non-select field are ignored
        store.put_option(FieldOption {
            id: "O1".to_string(),
            field_id: "F1".to_string(),
            label: "stray".to_string(),
            value: "stray".to_string(),
            option_order: None,
        });
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let fields = resolver.resolve("P1").await.unwrap();

        assert!(fields[0].options.is_empty());
    }

    #[tokio::test]
    async fn links_to_missing_definitions_are_skipped() {
        let store = MemoryStore::new();
        store.put_field(field("F1", "notes", FieldKind::String, None));
        store.put_field_link(link("L1", "F1", None));
        store.put_field_link(link("L2", "missing", None));
        let resolver = FieldCatalogResolver::new(Arc::new(store));

        let fields = resolver.resolve("P1").await.unwrap();

        assert_eq!(fields.len(), 1);
    }
}
