//! Reference scanners and the registry that groups them per entity type.
//!
//! A scanner answers one question: which records of one related resource
//! point at a given entity key? Scanners are declarative ([`ScannerSpec`]),
//! validated once into [`ReferenceScanner`], and grouped per entity type in
//! a [`ScannerRegistry`] that every service shares.

mod catalog;
mod registry;
mod scanner;
mod template;

pub use catalog::BUILTIN_ENTITY_TYPES;
pub use registry::{EntityType, EntityTypeSpec, ScannerRegistry};
pub use scanner::{ReferenceScanner, ScannerSpec};
pub use template::NameTemplate;
