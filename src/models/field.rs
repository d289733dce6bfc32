//! Data-entry field models.
//!
//! Field definitions are shared across products. A product attaches a
//! field through a `ProductFieldLink`, which can override the label,
//! placeholder, required flag and ordering, and can mark the field as
//! price-affecting. Select-typed fields additionally carry options,
//! and a price-affecting select can have per-option price overrides.

use serde::Serialize;

/// Field data type.
///
/// Determines both the inferred validation pattern and whether the
/// field can carry options (only `select` does).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Date,
    Boolean,
    File,
    Select,
}

/// Error for unrecognized field kind values coming out of the store.
#[derive(Debug, thiserror::Error)]
#[error("unknown field kind: {0}")]
pub struct UnknownFieldKind(String);

impl TryFrom<String> for FieldKind {
    type Error = UnknownFieldKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "boolean" => Ok(Self::Boolean),
            "file" => Ok(Self::File),
            "select" => Ok(Self::Select),
            _ => Err(UnknownFieldKind(value)),
        }
    }
}

/// Pricing behavior of an option price override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMode {
    /// The override price replaces the product's base price
    Set,
    /// The override price is a surcharge on top of the base price
    Add,
}

/// Error for unrecognized price mode values coming out of the store.
#[derive(Debug, thiserror::Error)]
#[error("unknown price mode: {0}")]
pub struct UnknownPriceMode(String);

impl TryFrom<String> for PriceMode {
    type Error = UnknownPriceMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "set" => Ok(Self::Set),
            "add" => Ok(Self::Add),
            _ => Err(UnknownPriceMode(value)),
        }
    }
}

/// A shared field definition, reusable across products.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FieldDefinition {
    pub id: String,

    /// Machine name of the field (e.g. `recipient_email`)
    pub name: String,

    /// Field data type
    #[sqlx(try_from = "String")]
    pub kind: FieldKind,

    /// Explicit validation pattern.
    ///
    /// When absent, a default pattern is inferred from the field kind
    /// and name at catalog-resolution time.
    pub validation_regex: Option<String>,
}

/// Per-product attachment of a shared field, with display overrides.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductFieldLink {
    pub id: String,
    pub product_id: String,
    pub field_id: String,

    /// Whether the field must be filled for this product
    pub required: bool,

    /// Label override; falls back to the field name when absent
    pub label: Option<String>,

    /// Placeholder override
    pub placeholder: Option<String>,

    /// Display position, ascending; unset sorts as 0
    pub field_order: Option<i64>,

    /// Whether the selected option of this field influences the price.
    ///
    /// At most one link per product should set this; extras are a data
    /// anomaly handled deterministically by the pricing resolver.
    pub affects_price: bool,
}

/// A selectable option of a `select`-typed field.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FieldOption {
    pub id: String,
    pub field_id: String,
    pub label: String,
    pub value: String,
    pub option_order: Option<i64>,
}

/// Per-product, per-option price override.
///
/// Anchored to a specific product-field link so the same option can be
/// priced differently on different products.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OptionPriceOverride {
    pub id: String,
    pub link_id: String,
    pub product_id: String,
    pub field_id: String,
    pub option_id: String,
    #[sqlx(try_from = "String")]
    pub mode: PriceMode,
    pub price: f64,
}

/// A fully resolved field descriptor as returned to API clients.
///
/// Produced by the field catalog resolver: per-product overrides merged
/// onto the shared definition, with a validation pattern always filled
/// in (explicit or inferred).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    /// Product-field link this descriptor was resolved from.
    ///
    /// Internal handle for the pricing resolver, not part of the
    /// response payload.
    #[serde(skip_serializing)]
    pub link_id: String,

    pub field_name: String,
    pub field_type: FieldKind,
    pub label: String,
    pub placeholder: String,
    pub is_required: bool,
    pub order: i64,
    pub affects_price: bool,
    pub validation_regex: String,

    /// Ordered options, present only for `select` fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ResolvedOption>,
}

/// A select option as returned to API clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOption {
    pub id: String,
    pub label: String,
    pub value: String,
    pub order: i64,
}
