//! Check and edit-check command handlers.

use color_eyre::Result;

use crate::models::Entity;
use crate::services::{EditService, UsageService};

use super::{parse_key, print_json, App};

impl App {
    /// Run the check command: print the usage result for one entity.
    pub async fn run_check(&self, entity_type: &str, key: &str) -> Result<()> {
        let key = parse_key(key)?;
        let ctx = self.context()?;
        let usage: UsageService = ctx.resolve();

        let result = usage.check_entity(entity_type, &key).await?;
        if !result.is_confirmed() {
            tracing::warn!(
                "{} of {} scanner(s) failed; the result may miss references",
                result.failed_scanners(),
                result.scanners().len()
            );
        }

        print_json(&result)
    }

    /// Run the edit-check command: print whether the edit is allowed.
    pub async fn run_edit_check(
        &self,
        entity_type: &str,
        key: &str,
        label: Option<&str>,
        fields: &[String],
    ) -> Result<()> {
        let key = parse_key(key)?;
        let label = label.map(str::to_string).unwrap_or_else(|| key.to_string());
        let ctx = self.context()?;
        let edits: EditService = ctx.resolve();

        let decision = edits
            .check_edit(&Entity::new(entity_type, key, label), fields)
            .await?;

        print_json(&decision)
    }
}
