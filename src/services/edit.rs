//! Key-field edit guard.

use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::models::{edit_blocked_message, EditDecision, Entity};

use super::UsageService;

/// Decides whether an edit may change an entity's key fields.
///
/// Non-key fields can always change. Key fields can only change while
/// nothing references the entity.
#[derive(Clone)]
pub struct EditService {
    usage: UsageService,
}

impl FromRef<Context> for EditService {
    fn from_ref(ctx: &Context) -> Self {
        Self {
            usage: UsageService::from_ref(ctx),
        }
    }
}

impl EditService {
    pub fn new(usage: UsageService) -> Self {
        Self { usage }
    }

    pub async fn check_edit(
        &self,
        entity: &Entity,
        changed_fields: &[String],
    ) -> Result<EditDecision, AppError> {
        let entity_type = self.usage.registry().get(&entity.entity_type)?;

        let key_fields: Vec<&str> = changed_fields
            .iter()
            .map(String::as_str)
            .filter(|field| entity_type.is_key_field(field))
            .collect();
        if key_fields.is_empty() {
            return Ok(EditDecision::Allowed);
        }

        let usage = self
            .usage
            .check_usage(&entity.key, entity_type.scanners())
            .await?;
        if !usage.in_use() {
            return Ok(EditDecision::Allowed);
        }

        tracing::info!(
            "Edit of {} {} blocked: key field(s) {} changed while referenced",
            entity.entity_type,
            entity.key,
            key_fields.join(", ")
        );
        Ok(EditDecision::Blocked {
            message: edit_blocked_message(entity_type.noun(), &entity.label, usage.records().len()),
            records: usage.into_records(),
        })
    }
}
