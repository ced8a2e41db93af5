//! Menu Normalizer
//!
//! Validates and normalizes a full replacement menu before it is accepted.
//! Validation is fail-fast: the first invalid item aborts the whole save and
//! nothing is written.
//!
//! Per item, in order:
//! 1. `current-ice-cream-flavors`: drop `price`, skip everything else
//! 2. promote `short` into an empty `description`
//! 3. `quantities`: resolve each option's value, enforce the section
//!    minimum, normalize option prices, rewrite as `{label, value, price}`
//! 4. else legacy `quantity`: same value rules, then the configured
//!    [`LegacyQuantityPolicy`]
//! 5. `price`: normalize to two decimals
//!
//! A second pass gives every item without any quantity the section default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::content::menu::{
    FIELD_DESCRIPTION, FIELD_ID, FIELD_ITEMS, FIELD_LABEL, FIELD_PRICE, FIELD_QUANTITIES,
    FIELD_QUANTITY, FIELD_SHORT, FIELD_TITLE, FIELD_VALUE, ICE_CREAM_FLAVORS, default_quantity,
    min_quantity,
};
use shared::{AppError, ErrorCode, Payload, QuantityOption};
use thiserror::Error;

use super::numeric::{is_blank, normalize_price, resolve_quantity};

/// What a save does with the legacy scalar `quantity`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyQuantityPolicy {
    /// Validate and keep the integer
    #[default]
    Preserve,
    /// Validate and rewrite as a single-entry `quantities` list
    Upgrade,
    /// Refuse payload items that only carry `quantity`
    Reject,
}

impl LegacyQuantityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Upgrade => "upgrade",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for LegacyQuantityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyQuantityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "upgrade" => Ok(Self::Upgrade),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown legacy quantity policy '{other}' (expected preserve, upgrade or reject)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("Invalid menu section at position {index}")]
    InvalidSection { index: usize },

    #[error("Invalid menu item at position {index} in section: {section}")]
    InvalidItem { section: String, index: usize },

    #[error("Invalid quantity option for item: {item}")]
    InvalidQuantityOption { section: String, item: String },

    #[error("Invalid quantity for item: {item}")]
    InvalidQuantity { section: String, item: String },

    #[error("{}", below_minimum_message(*.minimum, .item))]
    QuantityBelowMinimum {
        section: String,
        item: String,
        minimum: i64,
    },

    #[error("Invalid price for quantity option on item: {item}")]
    InvalidOptionPrice { section: String, item: String },

    #[error("Invalid price for item: {item}")]
    InvalidPrice { section: String, item: String },

    #[error("Legacy quantity field is not accepted for item: {item}")]
    LegacyQuantityRejected { section: String, item: String },
}

fn below_minimum_message(minimum: i64, item: &str) -> String {
    if minimum >= 1 {
        format!("Quantity must be at least {minimum} for wings & tenders item: {item}")
    } else {
        format!("Quantity cannot be negative for item: {item}")
    }
}

impl MenuError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidSection { .. } => ErrorCode::InvalidMenuSection,
            Self::InvalidItem { .. } => ErrorCode::InvalidMenuItem,
            Self::InvalidQuantityOption { .. } | Self::InvalidQuantity { .. } => {
                ErrorCode::InvalidQuantity
            }
            Self::QuantityBelowMinimum { .. } => ErrorCode::QuantityBelowMinimum,
            Self::InvalidOptionPrice { .. } | Self::InvalidPrice { .. } => ErrorCode::InvalidPrice,
            Self::LegacyQuantityRejected { .. } => ErrorCode::LegacyQuantityRejected,
        }
    }

    /// Offending field of the item
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSection { .. } | Self::InvalidItem { .. } => None,
            Self::InvalidQuantityOption { .. } | Self::InvalidOptionPrice { .. } => {
                Some(FIELD_QUANTITIES)
            }
            Self::QuantityBelowMinimum { .. }
            | Self::InvalidQuantity { .. }
            | Self::LegacyQuantityRejected { .. } => Some(FIELD_QUANTITY),
            Self::InvalidPrice { .. } => Some(FIELD_PRICE),
        }
    }

    pub fn section(&self) -> Option<&str> {
        match self {
            Self::InvalidSection { .. } => None,
            Self::InvalidItem { section, .. }
            | Self::InvalidQuantityOption { section, .. }
            | Self::InvalidQuantity { section, .. }
            | Self::QuantityBelowMinimum { section, .. }
            | Self::InvalidOptionPrice { section, .. }
            | Self::InvalidPrice { section, .. }
            | Self::LegacyQuantityRejected { section, .. } => Some(section),
        }
    }

    pub fn item(&self) -> Option<&str> {
        match self {
            Self::InvalidSection { .. } | Self::InvalidItem { .. } => None,
            Self::InvalidQuantityOption { item, .. }
            | Self::InvalidQuantity { item, .. }
            | Self::QuantityBelowMinimum { item, .. }
            | Self::InvalidOptionPrice { item, .. }
            | Self::InvalidPrice { item, .. }
            | Self::LegacyQuantityRejected { item, .. } => Some(item),
        }
    }
}

impl From<MenuError> for AppError {
    fn from(err: MenuError) -> Self {
        let mut app = AppError::with_message(err.code(), err.to_string());
        if let Some(section) = err.section() {
            app = app.with_detail("section", section);
        }
        if let Some(item) = err.item() {
            app = app.with_detail("item", item);
        }
        if let Some(field) = err.field() {
            app = app.with_detail("field", field);
        }
        match err {
            MenuError::InvalidSection { index } | MenuError::InvalidItem { index, .. } => {
                app.with_detail("index", index)
            }
            _ => app,
        }
    }
}

/// Item being validated, for error reporting
struct ItemRef<'a> {
    section: &'a str,
    title: String,
}

impl ItemRef<'_> {
    fn section(&self) -> String {
        self.section.to_string()
    }

    fn item(&self) -> String {
        self.title.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuNormalizer {
    legacy_quantity: LegacyQuantityPolicy,
}

impl MenuNormalizer {
    pub fn new(legacy_quantity: LegacyQuantityPolicy) -> Self {
        Self { legacy_quantity }
    }

    pub fn legacy_quantity(&self) -> LegacyQuantityPolicy {
        self.legacy_quantity
    }

    /// Normalize every item of every section
    ///
    /// Returns the normalized sections; on error the input is dropped and
    /// nothing partial escapes.
    pub fn normalize(&self, mut sections: Vec<Value>) -> Result<Vec<Value>, MenuError> {
        for (index, section) in sections.iter_mut().enumerate() {
            let section = section
                .as_object_mut()
                .ok_or(MenuError::InvalidSection { index })?;
            let section_id = text_of(section.get(FIELD_ID));

            let Some(items) = section_items_mut(section, index)? else {
                continue;
            };
            for (item_index, item) in items.iter_mut().enumerate() {
                let item = item.as_object_mut().ok_or_else(|| MenuError::InvalidItem {
                    section: section_id.clone(),
                    index: item_index,
                })?;
                self.normalize_item(&section_id, item)?;
            }
        }

        for section in sections.iter_mut() {
            let Some(section) = section.as_object_mut() else {
                continue;
            };
            let section_id = text_of(section.get(FIELD_ID));
            let Some(items) = section.get_mut(FIELD_ITEMS).and_then(Value::as_array_mut) else {
                continue;
            };
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                backfill_quantity(&section_id, item);
            }
        }

        Ok(sections)
    }

    fn normalize_item(
        &self,
        section_id: &str,
        item: &mut Map<String, Value>,
    ) -> Result<(), MenuError> {
        if section_id == ICE_CREAM_FLAVORS {
            item.shift_remove(FIELD_PRICE);
            return Ok(());
        }

        promote_description(item);

        let target = ItemRef {
            section: section_id,
            title: text_of(item.get(FIELD_TITLE)),
        };

        let options = match item.get(FIELD_QUANTITIES).filter(|v| !v.is_null()) {
            Some(options) => normalize_options(&target, options)?,
            None => Vec::new(),
        };

        if options.is_empty() {
            // An emptied option list counts as absent
            item.shift_remove(FIELD_QUANTITIES);
        } else {
            item.insert(
                FIELD_QUANTITIES.to_string(),
                Value::Array(options.iter().map(QuantityOption::to_value).collect()),
            );
            item.shift_remove(FIELD_QUANTITY);
        }

        if options.is_empty()
            && let Some(quantity) = item.get(FIELD_QUANTITY).filter(|v| !v.is_null())
        {
            if self.legacy_quantity == LegacyQuantityPolicy::Reject {
                return Err(MenuError::LegacyQuantityRejected {
                    section: target.section(),
                    item: target.item(),
                });
            }
            let value = resolve_quantity(quantity).ok_or_else(|| MenuError::InvalidQuantity {
                section: target.section(),
                item: target.item(),
            })?;
            check_minimum(&target, value)?;

            match self.legacy_quantity {
                LegacyQuantityPolicy::Upgrade => {
                    let option = QuantityOption::from_legacy(value);
                    item.insert(
                        FIELD_QUANTITIES.to_string(),
                        Value::Array(vec![option.to_value()]),
                    );
                    item.shift_remove(FIELD_QUANTITY);
                }
                _ => {
                    item.insert(FIELD_QUANTITY.to_string(), Value::from(value));
                }
            }
        }

        if let Some(price) = item.get(FIELD_PRICE)
            && !is_blank(price)
        {
            let normalized = normalize_price(price).ok_or_else(|| MenuError::InvalidPrice {
                section: target.section(),
                item: target.item(),
            })?;
            item.insert(FIELD_PRICE.to_string(), Value::String(normalized));
        }

        Ok(())
    }
}

/// The section's item list, converted to an array if it arrived index-keyed
fn section_items_mut(
    section: &mut Map<String, Value>,
    index: usize,
) -> Result<Option<&mut Vec<Value>>, MenuError> {
    let Some(items) = section.get_mut(FIELD_ITEMS) else {
        return Ok(None);
    };
    if items.is_null() {
        return Ok(None);
    }
    if !items.is_array() {
        match Payload::classify(items.take()) {
            Payload::List(list) => *items = Value::Array(list),
            Payload::Map(map) => *items = Value::Array(map.into_iter().map(|(_, v)| v).collect()),
            Payload::Scalar(_) => return Err(MenuError::InvalidSection { index }),
        }
    }
    Ok(items.as_array_mut())
}

fn normalize_options(
    target: &ItemRef<'_>,
    options: &Value,
) -> Result<Vec<QuantityOption>, MenuError> {
    let invalid_option = || MenuError::InvalidQuantityOption {
        section: target.section(),
        item: target.item(),
    };

    let options = match Payload::classify(options.clone()) {
        Payload::List(list) => list,
        Payload::Map(map) => map.into_iter().map(|(_, v)| v).collect(),
        Payload::Scalar(_) => return Err(invalid_option()),
    };

    options
        .iter()
        .map(|option| {
            let option = option.as_object().ok_or_else(invalid_option)?;
            let value = option
                .get(FIELD_VALUE)
                .and_then(resolve_quantity)
                .ok_or_else(invalid_option)?;
            check_minimum(target, value)?;

            let price = match option.get(FIELD_PRICE) {
                Some(price) if !is_blank(price) => {
                    Some(normalize_price(price).ok_or_else(|| MenuError::InvalidOptionPrice {
                        section: target.section(),
                        item: target.item(),
                    })?)
                }
                _ => None,
            };

            Ok(QuantityOption::new(
                text_of(option.get(FIELD_LABEL)),
                value,
                price,
            ))
        })
        .collect()
}

fn check_minimum(target: &ItemRef<'_>, value: i64) -> Result<(), MenuError> {
    let minimum = min_quantity(target.section);
    if value < minimum {
        return Err(MenuError::QuantityBelowMinimum {
            section: target.section(),
            item: target.item(),
            minimum,
        });
    }
    Ok(())
}

/// `description` is canonical; an empty one takes the legacy `short` text
pub(crate) fn promote_description(item: &mut Map<String, Value>) -> bool {
    let description_empty = item.get(FIELD_DESCRIPTION).is_none_or(is_blank);
    let short = match item.get(FIELD_SHORT) {
        Some(Value::String(short)) if !short.trim().is_empty() => short.clone(),
        _ => return false,
    };
    if description_empty {
        item.insert(FIELD_DESCRIPTION.to_string(), Value::String(short));
        return true;
    }
    false
}

fn backfill_quantity(section_id: &str, item: &mut Map<String, Value>) {
    let has_options = item
        .get(FIELD_QUANTITIES)
        .and_then(Value::as_array)
        .is_some_and(|options| !options.is_empty());
    let has_quantity = item.get(FIELD_QUANTITY).is_some_and(|v| !v.is_null());
    if has_options || has_quantity {
        return;
    }
    item.shift_remove(FIELD_QUANTITIES);
    item.insert(
        FIELD_QUANTITY.to_string(),
        Value::from(default_quantity(section_id)),
    );
}

/// Loose text value: strings as-is, numbers rendered, anything else empty
pub(crate) fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
