//! Entity model: the catalog record a delete or key edit is aimed at.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier of a catalog record.
///
/// Comparison against backend fields is strict: a numeric key only matches
/// JSON numbers and a text key only matches JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    Number(i64),
    Text(String),
}

impl EntityKey {
    /// Parse a key typed by a user: integers become numeric keys, anything
    /// else stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => EntityKey::Number(n),
            Err(_) => EntityKey::Text(trimmed.to_string()),
        }
    }

    /// Whether a record field holds this key.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            EntityKey::Number(n) => match value {
                Value::Number(num) => {
                    num.as_i64() == Some(*n)
                        || (num.as_i64().is_none() && num.as_f64() == Some(*n as f64))
                }
                _ => false,
            },
            EntityKey::Text(s) => value.as_str() == Some(s.as_str()),
        }
    }

    /// Empty text keys identify nothing and are rejected before scanning.
    pub fn is_empty(&self) -> bool {
        matches!(self, EntityKey::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Number(n) => write!(f, "{}", n),
            EntityKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityKey {
    fn from(n: i64) -> Self {
        EntityKey::Number(n)
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        EntityKey::Text(s.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(s: String) -> Self {
        EntityKey::Text(s)
    }
}

/// A catalog record targeted by a delete or key-field edit.
///
/// Transient: it lives for one attempt and is owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Registry name of the catalog kind (e.g. `service-type`).
    pub entity_type: String,
    /// Backend identifier.
    pub key: EntityKey,
    /// Human-readable label used in messages.
    pub label: String,
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        key: impl Into<EntityKey>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            key: key.into(),
            label: label.into(),
        }
    }
}
