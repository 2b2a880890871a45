//! Scanners command handler.

use std::collections::BTreeMap;

use color_eyre::Result;

use crate::scanners::{EntityTypeSpec, ScannerRegistry};

use super::{print_json, App};

impl App {
    /// Run the scanners command: print the effective registry.
    pub fn run_scanners(&self, entity_type: Option<&str>) -> Result<()> {
        let ctx = self.context()?;
        let registry: ScannerRegistry = ctx.resolve();

        let specs: BTreeMap<String, EntityTypeSpec> = match entity_type {
            Some(name) => {
                let entity_type = registry.get(name)?;
                BTreeMap::from([(entity_type.name().to_string(), entity_type.to_spec())])
            }
            None => registry
                .entity_types()
                .map(|t| (t.name().to_string(), t.to_spec()))
                .collect(),
        };

        print_json(&specs)
    }
}
