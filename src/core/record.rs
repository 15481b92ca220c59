//! Data rows as they arrive from the panel API.

use serde_json::Value;

/// One data row: field name → JSON value.  The shape is implied by the
/// panel's columns but never enforced.
pub type Record = serde_json::Map<String, Value>;

/// Text of a cell, or `None` for missing / null values.
///
/// Strings are returned as-is, numbers and booleans in their JSON spelling,
/// nested values as compact JSON.
pub fn cell_text(record: &Record, field: &str) -> Option<String> {
    value_text(record.get(field)?)
}

/// Text of a single JSON value, `None` for null.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Whether a cell has a value worth showing: null, `""`, `0` and `false`
/// do not.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

/// Numeric value of a cell; anything non-numeric counts as `0`.
pub fn cell_number(record: &Record, field: &str) -> f64 {
    let n = match record.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
pub(crate) fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}
