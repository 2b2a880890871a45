//! Scanner registry: entity type -> ordered scanners.
//!
//! Built once at startup from the built-in table plus config overrides, then
//! shared read-only by every service.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::{ReferenceScanner, ScannerSpec, BUILTIN_ENTITY_TYPES};

/// Declarative entity type definition, as written in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeSpec {
    /// Display noun used in messages, e.g. "service type".
    pub noun: String,
    /// Collection a record of this type is deleted from.
    pub delete_resource: String,
    /// Fields whose change counts as a key-field edit.
    #[serde(default)]
    pub key_fields: Vec<String>,
    /// Scanners in declaration order.
    #[serde(default)]
    pub scanners: Vec<ScannerSpec>,
}

/// A validated entity type.
#[derive(Debug, Clone)]
pub struct EntityType {
    name: String,
    noun: String,
    delete_resource: String,
    key_fields: Vec<String>,
    scanners: Vec<ReferenceScanner>,
}

impl EntityType {
    fn from_spec(name: &str, spec: &EntityTypeSpec) -> Result<Self, AppError> {
        if spec.delete_resource.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "entity type '{}' has no delete_resource",
                name
            )));
        }

        let scanners = spec
            .scanners
            .iter()
            .map(ReferenceScanner::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            noun: if spec.noun.trim().is_empty() {
                name.replace('-', " ")
            } else {
                spec.noun.clone()
            },
            delete_resource: spec.delete_resource.clone(),
            key_fields: spec.key_fields.clone(),
            scanners,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn noun(&self) -> &str {
        &self.noun
    }

    pub fn delete_resource(&self) -> &str {
        &self.delete_resource
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    pub fn scanners(&self) -> &[ReferenceScanner] {
        &self.scanners
    }

    /// Whether changing `field` counts as a key-field edit.
    pub fn is_key_field(&self, field: &str) -> bool {
        self.key_fields.iter().any(|k| k == field)
    }

    pub fn to_spec(&self) -> EntityTypeSpec {
        EntityTypeSpec {
            noun: self.noun.clone(),
            delete_resource: self.delete_resource.clone(),
            key_fields: self.key_fields.clone(),
            scanners: self.scanners.iter().map(ReferenceScanner::to_spec).collect(),
        }
    }
}

/// Immutable, cheaply cloneable table of entity types.
#[derive(Debug, Clone)]
pub struct ScannerRegistry {
    types: Arc<BTreeMap<String, Arc<EntityType>>>,
}

impl ScannerRegistry {
    /// Registry with only the built-in catalog types.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_specs(BUILTIN_ENTITY_TYPES.iter())
    }

    /// Built-in types, with `overrides` replacing or adding entries by name.
    pub fn with_overrides(overrides: &BTreeMap<String, EntityTypeSpec>) -> Result<Self, AppError> {
        let mut merged: BTreeMap<&String, &EntityTypeSpec> = BUILTIN_ENTITY_TYPES.iter().collect();
        for (name, spec) in overrides {
            if merged.insert(name, spec).is_some() {
                tracing::debug!("Entity type '{}' overridden by configuration", name);
            }
        }
        Self::from_specs(merged.into_iter())
    }

    /// Build from explicit specs only.
    pub fn from_specs<'a, I>(specs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (&'a String, &'a EntityTypeSpec)>,
    {
        let mut types = BTreeMap::new();
        for (name, spec) in specs {
            let entity_type = EntityType::from_spec(name, spec)?;
            types.insert(name.clone(), Arc::new(entity_type));
        }
        Ok(Self {
            types: Arc::new(types),
        })
    }

    /// Look up an entity type by name.
    pub fn get(&self, name: &str) -> Result<Arc<EntityType>, AppError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::UnknownEntityType(name.to_string()))
    }

    /// All entity types, ordered by name.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.types.values().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
