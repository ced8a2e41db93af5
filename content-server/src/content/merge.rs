//! Merge Engine
//!
//! Applies one `{section, content}` update to the in-memory document:
//!
//! | Payload | `menu`                       | other sections            |
//! |---------|------------------------------|---------------------------|
//! | List    | replace, then normalize      | replace                   |
//! | Map     | values become the list, then normalize | recursive merge |
//! | Scalar  | rejected                     | replace                   |
//!
//! `last_updated` is owned by the store and cannot be edited.

use serde_json::{Map, Value};
use shared::content::{LAST_UPDATED, SECTION_MENU};
use shared::{AppError, AppResult, ContentDocument, ErrorCode, Payload};

use super::menu::MenuNormalizer;

/// Validate a section name from a request
pub fn validate_section_name(section: &str) -> AppResult<&str> {
    let section = section.trim();
    if section.is_empty() {
        return Err(AppError::new(ErrorCode::SectionRequired));
    }
    if section == LAST_UPDATED {
        return Err(AppError::new(ErrorCode::SectionNotEditable).with_detail("section", section));
    }
    Ok(section)
}

/// Apply `content` to `section` of `document`
///
/// On error the document is left as it was.
pub fn apply_section(
    document: &mut ContentDocument,
    section: &str,
    content: Value,
    normalizer: &MenuNormalizer,
) -> AppResult<()> {
    let section = validate_section_name(section)?;
    let payload = Payload::classify(content);

    if section == SECTION_MENU {
        let sections = match payload {
            Payload::List(list) => list,
            Payload::Map(map) => map.into_iter().map(|(_, v)| v).collect(),
            Payload::Scalar(_) => {
                return Err(AppError::with_message(
                    ErrorCode::InvalidMenuSection,
                    "Menu must be a list of sections",
                )
                .with_detail("section", SECTION_MENU));
            }
        };
        let menu = normalizer.normalize(sections)?;
        document.set_section(SECTION_MENU, Value::Array(menu));
        return Ok(());
    }

    match payload {
        Payload::List(list) => document.set_section(section, Value::Array(list)),
        Payload::Scalar(value) => document.set_section(section, value),
        Payload::Map(incoming) => match document.section_mut(section) {
            Some(Value::Object(existing)) => merge_maps(existing, incoming),
            _ => document.set_section(section, Value::Object(incoming)),
        },
    }
    Ok(())
}

/// Recursively merge `incoming` into `existing`
///
/// Keyed into keyed recurses; anything else overwrites. Existing keys keep
/// their position, new keys are appended.
pub fn merge_maps(existing: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (existing.get_mut(&key), value) {
            (Some(Value::Object(current)), Value::Object(next)) => merge_maps(current, next),
            (_, value) => {
                existing.insert(key, value);
            }
        }
    }
}
