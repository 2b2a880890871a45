//! Usage check results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record elsewhere in the system that refers to the checked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentRecord {
    /// Kind of the referencing record (e.g. "Service", "Work Order").
    #[serde(rename = "type")]
    pub record_type: String,
    /// Human-readable name built from the scanner's template.
    pub name: String,
    /// The referencing record's own identifier, as the backend sent it.
    pub id: Value,
}

/// How a single scanner ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScannerState {
    /// The collection was read; `matches` records referenced the entity.
    Ok { matches: usize },
    /// The collection could not be read. Treated as zero matches.
    Failed { reason: String },
    /// The read exceeded the scanner timeout. Treated as zero matches.
    TimedOut { after_ms: u64 },
}

/// Per-scanner outcome, reported alongside the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannerStatus {
    pub resource: String,
    pub type_label: String,
    #[serde(flatten)]
    pub state: ScannerState,
}

impl ScannerStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self.state, ScannerState::Ok { .. })
    }
}

/// Aggregate result of a usage check.
///
/// `in_use` is derived from `records` at construction and the fields are
/// read-only, so `in_use == !records.is_empty()` always holds.
#[derive(Debug, Clone, Serialize)]
pub struct UsageResult {
    in_use: bool,
    records: Vec<DependentRecord>,
    scanners: Vec<ScannerStatus>,
    checked_at: DateTime<Utc>,
}

impl UsageResult {
    /// Build from per-scanner results, preserving declaration order.
    pub fn from_scans(scans: Vec<(ScannerStatus, Vec<DependentRecord>)>) -> Self {
        let mut records = Vec::new();
        let mut scanners = Vec::with_capacity(scans.len());
        for (status, matches) in scans {
            records.extend(matches);
            scanners.push(status);
        }

        Self {
            in_use: !records.is_empty(),
            records,
            scanners,
            checked_at: Utc::now(),
        }
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn records(&self) -> &[DependentRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DependentRecord> {
        self.records
    }

    pub fn scanners(&self) -> &[ScannerStatus] {
        &self.scanners
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Number of scanners whose failure was swallowed.
    pub fn failed_scanners(&self) -> usize {
        self.scanners.iter().filter(|s| s.is_failure()).count()
    }

    /// True when every scanner read its collection, so "not in use" is a
    /// confirmed answer rather than a possibly incomplete one.
    pub fn is_confirmed(&self) -> bool {
        self.failed_scanners() == 0
    }
}
