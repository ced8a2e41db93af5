//! Legacy quantity migration
//!
//! One-off upgrade of stored menus: every item still carrying the scalar
//! `quantity` gets the single-option `quantities` list instead, and an
//! empty `description` is filled from `short`.

use serde::Serialize;
use serde_json::Value;
use shared::QuantityOption;
use shared::content::menu::{FIELD_ITEMS, FIELD_QUANTITIES, FIELD_QUANTITY, FIELD_TITLE};
use shared::ContentDocument;

use super::menu::{promote_description, text_of};
use super::numeric::resolve_quantity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub sections: usize,
    pub items: usize,
    pub quantities_upgraded: usize,
    pub descriptions_promoted: usize,
    /// Titles of items whose legacy quantity could not be read
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.quantities_upgraded > 0 || self.descriptions_promoted > 0
    }
}

/// Upgrade legacy quantities in place
pub fn migrate_legacy_quantities(document: &mut ContentDocument) -> MigrationReport {
    let mut report = MigrationReport::default();
    let Some(sections) = document.menu_sections_mut() else {
        return report;
    };

    for section in sections.iter_mut().filter_map(Value::as_object_mut) {
        report.sections += 1;
        let Some(items) = section.get_mut(FIELD_ITEMS).and_then(Value::as_array_mut) else {
            continue;
        };

        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            report.items += 1;
            if promote_description(item) {
                report.descriptions_promoted += 1;
            }

            let has_quantities = item
                .get(FIELD_QUANTITIES)
                .and_then(Value::as_array)
                .is_some_and(|options| !options.is_empty());
            let legacy = item.get(FIELD_QUANTITY).filter(|v| !v.is_null());
            let Some(legacy) = legacy.filter(|_| !has_quantities) else {
                continue;
            };

            match resolve_quantity(legacy) {
                Some(value) => {
                    item.insert(
                        FIELD_QUANTITIES.to_string(),
                        Value::Array(vec![QuantityOption::from_legacy(value).to_value()]),
                    );
                    item.shift_remove(FIELD_QUANTITY);
                    report.quantities_upgraded += 1;
                }
                None => report.skipped.push(text_of(item.get(FIELD_TITLE))),
            }
        }
    }

    report
}
