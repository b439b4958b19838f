//! Helpers shared by the signed HTTP clients.

use reqwest::StatusCode;
use serde_json::Value;

/// Best human-readable detail from an error response body.
///
/// Tries each of `keys` as a JSON string field, then the JSON text itself,
/// then the raw body, then the bare status code.
pub(crate) fn error_detail(status: StatusCode, body: &str, keys: &[&str]) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let from_key = keys
            .iter()
            .filter_map(|key| json.get(*key))
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string));
        return from_key.unwrap_or_else(|| json.to_string());
    }

    if body.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body.to_string()
    }
}

/// Render a scalar JSON field as text; anything else is empty.
pub(crate) fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
