//! Core traits for catalog backend access.
//!
//! - [`ResourceReader`] - list a collection of records (required by scanners)
//! - [`ResourceWriter`] - delete one record by key (required by guarded deletes)

use async_trait::async_trait;

use crate::error::ResourceError;
use crate::models::{EntityKey, Record};

/// Reads whole collections from a catalog backend.
///
/// The guard makes no assumption about the wire format beyond "a list of
/// records with named fields".
#[async_trait]
pub trait ResourceReader: Send + Sync {
    /// Fetches every record of the collection at `resource`
    /// (e.g. `/catalog/services`).
    async fn fetch_collection(&self, resource: &str) -> Result<Vec<Record>, ResourceError>;
}

/// Deletes records from a catalog backend.
#[async_trait]
pub trait ResourceWriter: Send + Sync {
    /// Deletes the record identified by `key` under `resource`.
    ///
    /// Integrity violations are reported as a [`ResourceError`] whose status
    /// or detail text identifies them; interpreting them is the caller's job.
    async fn delete_record(&self, resource: &str, key: &EntityKey) -> Result<(), ResourceError>;
}
