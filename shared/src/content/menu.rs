//! Menu entities
//!
//! The menu is stored as JSON sections, each with an `items` list. Item
//! objects keep whatever extra fields the editor sends, so sections and
//! items stay `serde_json` objects; only the rewritten quantity option has a
//! fixed shape.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Section whose quantity options must be at least 1
pub const WINGS_TENDERS: &str = "wings-tenders";

/// Section whose items never carry a price
pub const ICE_CREAM_FLAVORS: &str = "current-ice-cream-flavors";

// Field names shared by the normalizer and the migration
pub const FIELD_ID: &str = "id";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_ITEMS: &str = "items";
pub const FIELD_SHORT: &str = "short";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_QUANTITIES: &str = "quantities";
pub const FIELD_QUANTITY: &str = "quantity";
pub const FIELD_LABEL: &str = "label";
pub const FIELD_VALUE: &str = "value";

/// Minimum quantity value accepted in a section
pub fn min_quantity(section_id: &str) -> i64 {
    if section_id == WINGS_TENDERS { 1 } else { 0 }
}

/// Quantity assigned to items that carry no quantity at all
pub fn default_quantity(section_id: &str) -> i64 {
    min_quantity(section_id)
}

/// One purchasable size of a menu item ("6 pc", "12 pc", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityOption {
    #[serde(default)]
    pub label: String,
    pub value: i64,
    /// Normalized `"0.00"` string, or empty when the option has no price
    #[serde(default)]
    pub price: String,
}

impl QuantityOption {
    pub fn new(label: impl Into<String>, value: i64, price: Option<String>) -> Self {
        Self {
            label: label.into(),
            value,
            price: price.unwrap_or_default(),
        }
    }

    /// Legacy scalar quantity lifted into an option
    pub fn from_legacy(value: i64) -> Self {
        Self::new("", value, None)
    }

    /// Stored shape `{label, value, price}`
    pub fn to_value(&self) -> Value {
        json!({
            FIELD_LABEL: self.label,
            FIELD_VALUE: self.value,
            FIELD_PRICE: self.price,
        })
    }
}
