//! The content document
//!
//! A single JSON object holding every editable part of the site. Unknown
//! top-level keys are kept untouched, in their original order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SECTION_BUSINESS_INFO: &str = "business_info";
pub const SECTION_HERO: &str = "hero";
pub const SECTION_ABOUT: &str = "about";
pub const SECTION_HOURS: &str = "hours";
pub const SECTION_IMAGES: &str = "images";
pub const SECTION_MENU: &str = "menu";
/// Stamped by the store on every write, never taken from a payload
pub const LAST_UPDATED: &str = "last_updated";

/// Sections the admin editor knows about
pub const KNOWN_SECTIONS: &[&str] = &[
    SECTION_BUSINESS_INFO,
    SECTION_HERO,
    SECTION_ABOUT,
    SECTION_HOURS,
    SECTION_IMAGES,
    SECTION_MENU,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument(Map<String, Value>);

impl ContentDocument {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Replace a section
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn set_section(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }

    /// Menu sections, if the menu is stored as a list
    pub fn menu_sections(&self) -> Option<&Vec<Value>> {
        self.section(SECTION_MENU).and_then(Value::as_array)
    }

    pub fn menu_sections_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.section_mut(SECTION_MENU).and_then(Value::as_array_mut)
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.section(LAST_UPDATED).and_then(Value::as_str)
    }

    pub fn set_last_updated(&mut self, timestamp: impl Into<String>) {
        self.set_section(LAST_UPDATED, Value::String(timestamp.into()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Value> for ContentDocument {
    type Error = Value;

    /// Only JSON objects are documents; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
