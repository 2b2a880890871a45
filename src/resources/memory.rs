//! In-memory backend.
//!
//! Serves fixed collections from memory and records every delete instead of
//! performing it. Used for dry runs from a JSON fixture and in tests, where
//! individual resources can be made to fail, stall or reject deletes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, ResourceError};
use crate::models::{EntityKey, Record};

use super::payload::records_from_payload;
use super::traits::{ResourceReader, ResourceWriter};

/// Fixture file layout: `{ "collections": { "/catalog/services": [ ... ] } }`.
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    collections: HashMap<String, Value>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Vec<Record>>,
    fetch_failures: HashMap<String, ResourceError>,
    fetch_delays: HashMap<String, Duration>,
    fetch_counts: HashMap<String, usize>,
    delete_failures: Vec<ResourceError>,
    deleted: Vec<(String, EntityKey)>,
}

/// Catalog backend held in memory.
#[derive(Debug, Default)]
pub struct MemoryResources {
    state: Mutex<State>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load collections from a JSON fixture file.
    pub fn from_fixture(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Fixture(format!("{}: {}", path.display(), e)))?;
        let fixture: Fixture = serde_json::from_str(&raw)
            .map_err(|e| AppError::Fixture(format!("{}: {}", path.display(), e)))?;

        let resources = Self::new();
        for (resource, payload) in fixture.collections {
            let records = records_from_payload(&resource, payload)?;
            resources.lock().collections.insert(resource, records);
        }
        Ok(resources)
    }

    /// Builder form of [`insert_collection`](Self::insert_collection).
    pub fn with_collection(self, resource: &str, records: Value) -> Self {
        self.insert_collection(resource, records);
        self
    }

    /// Replace a collection. Non-object elements are dropped.
    pub fn insert_collection(&self, resource: &str, records: Value) {
        let records = match records {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        self.lock().collections.insert(resource.to_string(), records);
    }

    /// Make every fetch of `resource` fail with `error`.
    pub fn fail_fetch(&self, resource: &str, error: ResourceError) {
        self.lock()
            .fetch_failures
            .insert(resource.to_string(), error);
    }

    /// Delay every fetch of `resource` by `delay`.
    pub fn delay_fetch(&self, resource: &str, delay: Duration) {
        self.lock().fetch_delays.insert(resource.to_string(), delay);
    }

    /// Queue an error for the next delete call.
    pub fn fail_next_delete(&self, error: ResourceError) {
        self.lock().delete_failures.push(error);
    }

    /// Number of fetches issued against `resource`.
    pub fn fetch_count(&self, resource: &str) -> usize {
        self.lock().fetch_counts.get(resource).copied().unwrap_or(0)
    }

    /// Total number of fetches across all resources.
    pub fn total_fetches(&self) -> usize {
        self.lock().fetch_counts.values().sum()
    }

    /// Delete calls that reached the backend, in order (including rejected ones).
    pub fn deleted(&self) -> Vec<(String, EntityKey)> {
        self.lock().deleted.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ResourceReader for MemoryResources {
    async fn fetch_collection(&self, resource: &str) -> Result<Vec<Record>, ResourceError> {
        let delay = {
            let mut state = self.lock();
            *state.fetch_counts.entry(resource.to_string()).or_insert(0) += 1;
            state.fetch_delays.get(resource).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.lock();
        if let Some(error) = state.fetch_failures.get(resource) {
            return Err(error.clone());
        }

        state
            .collections
            .get(resource)
            .cloned()
            .ok_or_else(|| ResourceError::Status {
                resource: resource.to_string(),
                status: 404,
                detail: "Not Found".to_string(),
            })
    }
}

#[async_trait]
impl ResourceWriter for MemoryResources {
    async fn delete_record(&self, resource: &str, key: &EntityKey) -> Result<(), ResourceError> {
        let mut state = self.lock();
        state.deleted.push((resource.to_string(), key.clone()));

        if state.delete_failures.is_empty() {
            Ok(())
        } else {
            Err(state.delete_failures.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_serves_collections_and_counts() {
        let resources =
            MemoryResources::new().with_collection("/quotes", json!([{"id": 1}, {"id": 2}, 3]));

        let records = resources.fetch_collection("/quotes").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(resources.fetch_count("/quotes"), 1);
    }

    #[tokio::test]
    async fn test_missing_collection_is_404() {
        let resources = MemoryResources::new();
        let err = resources.fetch_collection("/nothing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_queued_delete_failure_applies_once() {
        let resources = MemoryResources::new();
        resources.fail_next_delete(ResourceError::Status {
            resource: "/catalog/service-types".to_string(),
            status: 409,
            detail: "conflict".to_string(),
        });

        let key = EntityKey::Number(3);
        assert!(resources
            .delete_record("/catalog/service-types", &key)
            .await
            .is_err());
        assert!(resources
            .delete_record("/catalog/service-types", &key)
            .await
            .is_ok());
        assert_eq!(resources.deleted().len(), 2);
    }

    #[tokio::test]
    async fn test_from_fixture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"collections": {{"/catalog/services": [{{"id_service": 1}}], "/quotes": {{"data": []}}}}}}"#
        )
        .unwrap();

        let resources = MemoryResources::from_fixture(file.path()).unwrap();
        assert_eq!(
            resources
                .fetch_collection("/catalog/services")
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(resources.fetch_collection("/quotes").await.unwrap().is_empty());
    }

    #[test]
    fn test_fixture_errors() {
        let err = MemoryResources::from_fixture(Path::new("/definitely/missing.json")).unwrap_err();
        assert_eq!(err.code(), "FIXTURE_ERROR");
    }
}
