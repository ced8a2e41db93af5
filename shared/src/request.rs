//! Request types for the shared crate
//!
//! Wire format of the admin editor's save call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FIELD_SECTION: &str = "section";
pub const FIELD_CSRF_TOKEN: &str = "csrf_token";

/// Save request body
///
/// ```json
/// { "csrf_token": "…", "section": "hero", "content": { "headline": "Welcome" } }
/// ```
///
/// Fields are optional at the wire level so a missing field is reported as
/// a 400 with a clear message instead of a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl SaveRequest {
    /// Build from a legacy form submission
    ///
    /// `section` and `csrf_token` are read as-is; every other field becomes
    /// a string entry of `content`. A later duplicate field wins.
    pub fn from_form_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut request = Self::default();
        let mut content = Map::new();
        for (key, value) in fields {
            match key.as_str() {
                FIELD_SECTION => request.section = Some(value),
                FIELD_CSRF_TOKEN => request.csrf_token = Some(value),
                _ => {
                    content.insert(key, Value::String(value));
                }
            }
        }
        request.content = Some(Value::Object(content));
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full() {
        let request: SaveRequest = serde_json::from_value(json!({
            "csrf_token": "abc",
            "section": "hero",
            "content": {"headline": "Welcome"}
        }))
        .unwrap();
        assert_eq!(request.csrf_token.as_deref(), Some("abc"));
        assert_eq!(request.section.as_deref(), Some("hero"));
        assert_eq!(request.content, Some(json!({"headline": "Welcome"})));
    }

    #[test]
    fn test_null_content_is_missing() {
        let request: SaveRequest =
            serde_json::from_value(json!({"section": "hero", "content": null})).unwrap();
        assert!(request.content.is_none());
    }

    #[test]
    fn test_form_fields_collapse_into_content() {
        let request = SaveRequest::from_form_fields(vec![
            ("csrf_token".to_string(), "tok".to_string()),
            ("section".to_string(), "hero".to_string()),
            ("headline".to_string(), "Welcome".to_string()),
            ("subheadline".to_string(), "Since 1987".to_string()),
        ]);
        assert_eq!(request.csrf_token.as_deref(), Some("tok"));
        assert_eq!(request.section.as_deref(), Some("hero"));
        assert_eq!(
            request.content,
            Some(json!({"headline": "Welcome", "subheadline": "Since 1987"}))
        );
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let request: SaveRequest = serde_json::from_value(json!({"section": "hours"})).unwrap();
        assert_eq!(request.section.as_deref(), Some("hours"));
        assert!(request.csrf_token.is_none());
        assert!(request.content.is_none());
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"section": "hours"}));
    }
}
