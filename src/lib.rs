//! catalog-guard - referential usage guard for the ground-service catalog.
//!
//! Before a catalog entity is deleted or its key fields are edited, every
//! collection that may reference it is scanned. Referenced entities are
//! protected; unreferenced ones are deleted after confirmation, with the
//! backend's integrity errors as the final authority.

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod models;
pub mod resources;
pub mod scanners;
pub mod services;

pub use di::FromRef;
