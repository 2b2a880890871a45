//! Payload decoding shared by backends.

use serde_json::Value;

use crate::error::ResourceError;
use crate::models::Record;

/// Envelope keys some endpoints wrap their list in.
const ENVELOPE_KEYS: [&str; 2] = ["data", "items"];

/// Turn a decoded response body into records.
///
/// Accepts a bare JSON array or an object wrapping one under `data` or
/// `items`. Array elements that are not objects are skipped.
pub fn records_from_payload(resource: &str, payload: Value) -> Result<Vec<Record>, ResourceError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| ResourceError::Payload {
                resource: resource.to_string(),
                message: "expected a JSON array of records".to_string(),
            })?,
        other => {
            return Err(ResourceError::Payload {
                resource: resource.to_string(),
                message: format!("expected a JSON array of records, got {}", kind(&other)),
            })
        }
    };

    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            "{}: skipped {} non-object element(s)",
            resource,
            total - records.len()
        );
    }

    Ok(records)
}

/// Extract a readable error description from a response body.
///
/// FastAPI-style bodies carry `{"detail": "..."}` or, for validation errors,
/// `{"detail": [{"msg": "..."}, ...]}`. Anything else is returned trimmed.
pub fn detail_from_body(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                Some(msg) => msg.to_string(),
                None => entry.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => trimmed.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let records =
            records_from_payload("/quotes", json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_enveloped_array() {
        let records =
            records_from_payload("/quotes", json!({"data": [{"id": 1}], "total": 1})).unwrap();
        assert_eq!(records.len(), 1);
        let records = records_from_payload("/quotes", json!({"items": []})).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_non_objects_skipped() {
        let records = records_from_payload("/quotes", json!([{"id": 1}, 5, "x", null])).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = records_from_payload("/quotes", json!("oops")).unwrap_err();
        assert!(matches!(err, ResourceError::Payload { .. }));
        assert!(records_from_payload("/quotes", json!({"detail": "x"})).is_err());
    }

    #[test]
    fn test_detail_string() {
        assert_eq!(
            detail_from_body(r#"{"detail": "violates foreign key constraint"}"#),
            "violates foreign key constraint"
        );
    }

    #[test]
    fn test_detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["path"], "msg": "value is not a valid integer"}]}"#;
        assert_eq!(detail_from_body(body), "value is not a valid integer");
    }

    #[test]
    fn test_detail_plain_text() {
        assert_eq!(detail_from_body("  Internal Server Error \n"), "Internal Server Error");
    }
}
