//! Loosely typed backend records.

use serde_json::{Map, Value};

/// A record as returned by a catalog endpoint: named fields, any JSON value.
pub type Record = Map<String, Value>;

/// Truthiness used when choosing between fallback fields in a label.
///
/// Null, missing, empty strings, zero and `false` are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a field value for display. Missing and null render as empty text.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("WO-1"))));
        assert!(is_truthy(Some(&json!(12))));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(Some(&json!("Cleaning"))), "Cleaning");
        assert_eq!(render_value(Some(&json!(15))), "15");
        assert_eq!(render_value(Some(&Value::Null)), "");
        assert_eq!(render_value(None), "");
    }
}
