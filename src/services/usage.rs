//! Usage service: is an entity referenced anywhere else?

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::config::Config;
use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::models::{DependentRecord, EntityKey, Record, ScannerState, ScannerStatus, UsageResult};
use crate::resources::AppReader;
use crate::scanners::{ReferenceScanner, ScannerRegistry};

/// Result of reading one resource for a check.
enum Fetched {
    Records(Vec<Record>),
    Failed(String),
    TimedOut,
}

/// Runs scanners against the backend and aggregates their matches.
///
/// Read-only: a check never mutates anything and can be repeated freely,
/// though results change as the backend data changes.
#[derive(Clone)]
pub struct UsageService {
    reader: AppReader,
    registry: ScannerRegistry,
    scanner_timeout: Duration,
}

impl FromRef<Context> for UsageService {
    fn from_ref(ctx: &Context) -> Self {
        let config = Arc::<Config>::from_ref(ctx);
        Self {
            reader: AppReader::from_ref(ctx),
            registry: ScannerRegistry::from_ref(ctx),
            scanner_timeout: Duration::from_millis(config.guard.scanner_timeout_ms),
        }
    }
}

impl UsageService {
    pub fn new(reader: AppReader, registry: ScannerRegistry, scanner_timeout: Duration) -> Self {
        Self {
            reader,
            registry,
            scanner_timeout,
        }
    }

    pub fn registry(&self) -> &ScannerRegistry {
        &self.registry
    }

    /// Check whether any record read by `scanners` refers to `key`.
    ///
    /// All resources are read concurrently, each at most once per check and
    /// each bounded by the scanner timeout. A resource that cannot be read
    /// contributes no records; its scanners are reported as failed in
    /// [`UsageResult::scanners`]. The only error is an empty key.
    pub async fn check_usage(
        &self,
        key: &EntityKey,
        scanners: &[ReferenceScanner],
    ) -> Result<UsageResult, AppError> {
        if key.is_empty() {
            return Err(AppError::Validation("entity key is required".to_string()));
        }

        let mut resources: Vec<&str> = Vec::new();
        for scanner in scanners {
            if !resources.contains(&scanner.resource()) {
                resources.push(scanner.resource());
            }
        }

        let fetched: HashMap<&str, Fetched> = resources
            .iter()
            .copied()
            .zip(join_all(resources.iter().map(|r| self.fetch(r))).await)
            .collect();

        let scans = scanners
            .iter()
            .map(|scanner| self.apply(scanner, fetched.get(scanner.resource()), key))
            .collect();

        let result = UsageResult::from_scans(scans);
        tracing::debug!(
            "Usage of {}: {} dependent record(s), {} scanner failure(s)",
            key,
            result.records().len(),
            result.failed_scanners()
        );
        Ok(result)
    }

    /// Check an entity using the scanners registered for its type.
    pub async fn check_entity(
        &self,
        entity_type: &str,
        key: &EntityKey,
    ) -> Result<UsageResult, AppError> {
        let entity_type = self.registry.get(entity_type)?;
        self.check_usage(key, entity_type.scanners()).await
    }

    async fn fetch(&self, resource: &str) -> Fetched {
        match tokio::time::timeout(self.scanner_timeout, self.reader.fetch_collection(resource))
            .await
        {
            Ok(Ok(records)) => Fetched::Records(records),
            Ok(Err(err)) => {
                tracing::warn!("Reference scan of {} failed, counting no references: {}", resource, err);
                Fetched::Failed(err.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    "Reference scan of {} timed out after {:?}, counting no references",
                    resource,
                    self.scanner_timeout
                );
                Fetched::TimedOut
            }
        }
    }

    fn apply(
        &self,
        scanner: &ReferenceScanner,
        fetched: Option<&Fetched>,
        key: &EntityKey,
    ) -> (ScannerStatus, Vec<DependentRecord>) {
        let (state, matches) = match fetched {
            Some(Fetched::Records(records)) => {
                let matches = scanner.scan(records, key);
                (
                    ScannerState::Ok {
                        matches: matches.len(),
                    },
                    matches,
                )
            }
            Some(Fetched::Failed(reason)) => (
                ScannerState::Failed {
                    reason: reason.clone(),
                },
                Vec::new(),
            ),
            Some(Fetched::TimedOut) => (
                ScannerState::TimedOut {
                    after_ms: self.scanner_timeout.as_millis() as u64,
                },
                Vec::new(),
            ),
            None => (
                ScannerState::Failed {
                    reason: "resource was not read".to_string(),
                },
                Vec::new(),
            ),
        };

        (
            ScannerStatus {
                resource: scanner.resource().to_string(),
                type_label: scanner.type_label().to_string(),
                state,
            },
            matches,
        )
    }
}
