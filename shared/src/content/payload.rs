//! Payload classification
//!
//! Admin payloads arrive loosely typed: a section may be sent as a list, as
//! a keyed object, or as a bare scalar. Form-encoded submissions also turn
//! lists into objects keyed `"0"`, `"1"`, ... so those count as lists.

use serde_json::{Map, Value};

/// Shape of an incoming section payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// String, number, bool or null
    Scalar(Value),
    /// Sequential values (JSON array, or object keyed `0..n-1` in order)
    List(Vec<Value>),
    /// Keyed object
    Map(Map<String, Value>),
}

impl Payload {
    /// Classify a JSON value
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Payload::List(items),
            Value::Object(map) if is_index_keyed(&map) => {
                Payload::List(map.into_iter().map(|(_, v)| v).collect())
            }
            Value::Object(map) => Payload::Map(map),
            scalar => Payload::Scalar(scalar),
        }
    }

    /// Classify without taking ownership
    pub fn classify_ref(value: &Value) -> PayloadKind {
        match value {
            Value::Array(_) => PayloadKind::List,
            Value::Object(map) if is_index_keyed(map) => PayloadKind::List,
            Value::Object(_) => PayloadKind::Map,
            _ => PayloadKind::Scalar,
        }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Scalar(_) => PayloadKind::Scalar,
            Payload::List(_) => PayloadKind::List,
            Payload::Map(_) => PayloadKind::Map,
        }
    }

    /// Back into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            Payload::Scalar(v) => v,
            Payload::List(items) => Value::Array(items),
            Payload::Map(map) => Value::Object(map),
        }
    }
}

/// Discriminant of [`Payload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Scalar,
    List,
    Map,
}

impl PayloadKind {
    pub fn name(&self) -> &'static str {
        match self {
            PayloadKind::Scalar => "scalar",
            PayloadKind::List => "list",
            PayloadKind::Map => "map",
        }
    }
}

/// An empty object is keyed, not sequential.
fn is_index_keyed(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map
            .keys()
            .enumerate()
            .all(|(i, key)| *key == i.to_string())
}
