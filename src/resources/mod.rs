//! Resource abstraction over the catalog backend.
//!
//! The guard only needs two capabilities from the backend: list a
//! collection of loosely typed records, and delete one record by key.
//!
//! - [`ResourceReader`] - list a collection (used by every scanner)
//! - [`ResourceWriter`] - delete a record (used by guarded deletes)
//!
//! Backends:
//! - [`HttpResourceClient`] - the catalog REST API over `reqwest`
//! - [`MemoryResources`] - fixed collections held in memory
//!
//! # Usage
//!
//! ```ignore
//! use catalog_guard::resources::{HttpResourceClient, ResourceReader};
//!
//! let client = HttpResourceClient::new(&config.api)?;
//! let services = client.fetch_collection("/catalog/services").await?;
//! ```

mod payload;
mod traits;

pub mod http;
pub mod memory;

pub use http::HttpResourceClient;
pub use memory::MemoryResources;
pub use payload::{detail_from_body, records_from_payload};
pub use traits::{ResourceReader, ResourceWriter};

use std::sync::Arc;

/// Shared reader handle.
pub type AppReader = Arc<dyn ResourceReader>;

/// Shared writer handle.
pub type AppWriter = Arc<dyn ResourceWriter>;
