//! Blankness of attribute values.
//!
//! A value is blank when it carries no information: `null`, `false`, a string
//! of only whitespace, or an empty array/object. Numbers are never blank.

use serde_json::Value;

/// Returns true if the value is blank.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(_) => false,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Returns true if the value is not blank.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    !is_blank(value)
}
