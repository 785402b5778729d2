//! Project-specific utilities live here.

use serde_json::{json, Value};

/// Validation detail for a required field that is absent or empty.
pub fn required(field: &str) -> Value {
    json!({ "field": field, "error": "required" })
}

/// Non-empty text, or `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
