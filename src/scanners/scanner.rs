//! Reference scanner descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{DependentRecord, EntityKey, Record};

use super::NameTemplate;

/// Declarative scanner definition, as written in config or the built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerSpec {
    /// Collection to read, e.g. `/catalog/services`.
    pub resource: String,
    /// Fields holding the foreign key. A record matches if any of them does.
    pub fields: Vec<String>,
    /// Kind shown for each dependent record, e.g. "Service".
    pub label: String,
    /// Name template, e.g. `{service_code} - {service_name}`.
    pub name: String,
    /// Field holding the referencing record's own identifier.
    pub id_field: String,
}

impl ScannerSpec {
    pub fn new(
        resource: &str,
        fields: &[&str],
        label: &str,
        name: &str,
        id_field: &str,
    ) -> Self {
        Self {
            resource: resource.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            label: label.to_string(),
            name: name.to_string(),
            id_field: id_field.to_string(),
        }
    }
}

/// A validated, immutable scanner for one related resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceScanner {
    resource: String,
    fields: Vec<String>,
    type_label: String,
    name: NameTemplate,
    id_field: String,
}

impl ReferenceScanner {
    /// Validate a spec and compile its name template.
    pub fn from_spec(spec: &ScannerSpec) -> Result<Self, AppError> {
        let invalid = |reason: &str| AppError::InvalidScanner {
            resource: spec.resource.clone(),
            reason: reason.to_string(),
        };

        if spec.resource.trim().is_empty() {
            return Err(invalid("resource is empty"));
        }
        if spec.fields.is_empty() || spec.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(invalid("at least one non-empty field is required"));
        }
        if spec.label.trim().is_empty() {
            return Err(invalid("label is empty"));
        }
        if spec.id_field.trim().is_empty() {
            return Err(invalid("id_field is empty"));
        }
        let name = NameTemplate::parse(&spec.name).map_err(|reason| invalid(&reason))?;

        Ok(Self {
            resource: spec.resource.clone(),
            fields: spec.fields.clone(),
            type_label: spec.label.clone(),
            name,
            id_field: spec.id_field.clone(),
        })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    pub fn name_template(&self) -> &NameTemplate {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Whether `record` refers to `key` through any scanned field.
    pub fn matches(&self, record: &Record, key: &EntityKey) -> bool {
        self.fields
            .iter()
            .filter_map(|field| record.get(field))
            .any(|value| key.matches(value))
    }

    /// Describe a matching record.
    pub fn describe(&self, record: &Record) -> DependentRecord {
        DependentRecord {
            record_type: self.type_label.clone(),
            name: self.name.render(record),
            id: record.get(&self.id_field).cloned().unwrap_or(Value::Null),
        }
    }

    /// Dependent records for `key` among `records`, in collection order.
    pub fn scan(&self, records: &[Record], key: &EntityKey) -> Vec<DependentRecord> {
        records
            .iter()
            .filter(|record| self.matches(record, key))
            .map(|record| self.describe(record))
            .collect()
    }

    /// Back to the declarative form, for listing.
    pub fn to_spec(&self) -> ScannerSpec {
        ScannerSpec {
            resource: self.resource.clone(),
            fields: self.fields.clone(),
            label: self.type_label.clone(),
            name: self.name.as_str().to_string(),
            id_field: self.id_field.clone(),
        }
    }
}
