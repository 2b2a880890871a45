//! Guarded delete service.
//!
//! A delete runs as a two-step flow:
//! - [`DeleteService::begin_delete`] checks usage and either blocks or hands
//!   out a [`DeleteTicket`] awaiting confirmation;
//! - [`DeleteService::confirm`] re-checks usage and only then issues the
//!   delete. [`DeleteService::cancel`] (or dropping the ticket) ends the flow
//!   without touching the backend.
//!
//! At most one flow per `(entity type, key)` is live at a time.

use std::future::Future;
use std::sync::Arc;

use ulid::Ulid;

use crate::config::Config;
use crate::context::Context;
use crate::di::FromRef;
use crate::error::{AppError, ResourceError};
use crate::models::{
    blocked_by_constraint_message, blocked_by_usage_message, deleted_message, failed_message,
    DeleteFlowState, DeleteOutcome, DependentRecord, Entity, EntityKey, UsageResult,
};
use crate::resources::AppWriter;
use crate::scanners::EntityType;

use super::{FlightSlot, InFlight, UsageService};

/// Result of starting a delete flow.
#[derive(Debug)]
pub enum DeleteStart {
    /// The entity is referenced; no delete will be attempted.
    Blocked(DeleteOutcome),
    /// No references found; the caller must confirm or cancel.
    AwaitingConfirmation(DeleteTicket),
}

/// Handle of a delete flow awaiting confirmation.
///
/// Holds the single-flight slot for its entity until it is confirmed,
/// cancelled or dropped.
#[derive(Debug)]
pub struct DeleteTicket {
    id: Ulid,
    entity: Entity,
    entity_type: Arc<EntityType>,
    state: DeleteFlowState,
    usage: Option<UsageResult>,
    _slot: FlightSlot,
}

impl DeleteTicket {
    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn state(&self) -> &DeleteFlowState {
        &self.state
    }

    /// Result of the most recent usage check.
    pub fn usage(&self) -> Option<&UsageResult> {
        self.usage.as_ref()
    }

    fn advance(&mut self, next: DeleteFlowState) -> Result<(), AppError> {
        if !self.state.allows(&next) {
            return Err(AppError::FlowClosed(format!(
                "delete flow {} cannot move from {} to {}",
                self.id,
                self.state.name(),
                next.name()
            )));
        }

        tracing::debug!(
            "Delete flow {} for {} {}: {} -> {}",
            self.id,
            self.entity.entity_type,
            self.entity.key,
            self.state.name(),
            next.name()
        );
        self.state = next;
        Ok(())
    }
}

impl Drop for DeleteTicket {
    fn drop(&mut self) {
        if self.state == DeleteFlowState::Confirming {
            tracing::info!(
                "Delete of {} {} abandoned before confirmation",
                self.entity.entity_type,
                self.entity.key
            );
        }
    }
}

/// Service running guarded deletes.
#[derive(Clone)]
pub struct DeleteService {
    usage: UsageService,
    writer: AppWriter,
    flights: InFlight,
    conflict_markers: Vec<String>,
}

impl FromRef<Context> for DeleteService {
    fn from_ref(ctx: &Context) -> Self {
        let config = Arc::<Config>::from_ref(ctx);
        Self {
            usage: UsageService::from_ref(ctx),
            writer: AppWriter::from_ref(ctx),
            flights: InFlight::from_ref(ctx),
            conflict_markers: config.guard.conflict_markers.clone(),
        }
    }
}

impl DeleteService {
    pub fn new(
        usage: UsageService,
        writer: AppWriter,
        flights: InFlight,
        conflict_markers: Vec<String>,
    ) -> Self {
        Self {
            usage,
            writer,
            flights,
            conflict_markers,
        }
    }

    /// Check usage and open a flow awaiting confirmation.
    ///
    /// Fails with [`AppError::DeleteInFlight`] if another flow for the same
    /// entity is live.
    pub async fn begin_delete(&self, entity: Entity) -> Result<DeleteStart, AppError> {
        let entity_type = self.usage.registry().get(&entity.entity_type)?;
        let slot = self
            .flights
            .try_acquire(&entity.entity_type, &entity.key)?;

        let mut ticket = DeleteTicket {
            id: Ulid::new(),
            entity,
            entity_type,
            state: DeleteFlowState::Idle,
            usage: None,
            _slot: slot,
        };

        ticket.advance(DeleteFlowState::Checking)?;
        let usage = self
            .usage
            .check_usage(&ticket.entity.key, ticket.entity_type.scanners())
            .await?;

        if usage.in_use() {
            let outcome = self.blocked_by_usage(&ticket, usage.records());
            ticket.usage = Some(usage);
            ticket.advance(DeleteFlowState::from_outcome(&outcome))?;
            return Ok(DeleteStart::Blocked(outcome));
        }

        ticket.usage = Some(usage);
        ticket.advance(DeleteFlowState::Confirming)?;
        Ok(DeleteStart::AwaitingConfirmation(ticket))
    }

    /// Confirm a flow, deleting through the configured backend.
    pub async fn confirm(&self, ticket: DeleteTicket) -> Result<DeleteOutcome, AppError> {
        let writer = self.writer.clone();
        let resource = ticket.entity_type.delete_resource().to_string();
        self.confirm_with(ticket, move |key| async move {
            writer.delete_record(&resource, &key).await
        })
        .await
    }

    /// Confirm a flow, deleting with `delete_fn`.
    ///
    /// Usage is checked again first; `delete_fn` is called at most once and
    /// only when that check finds nothing.
    pub async fn confirm_with<F, Fut>(
        &self,
        mut ticket: DeleteTicket,
        delete_fn: F,
    ) -> Result<DeleteOutcome, AppError>
    where
        F: FnOnce(EntityKey) -> Fut,
        Fut: Future<Output = Result<(), ResourceError>>,
    {
        ticket.advance(DeleteFlowState::Checking)?;
        let usage = self
            .usage
            .check_usage(&ticket.entity.key, ticket.entity_type.scanners())
            .await?;

        if usage.in_use() {
            let outcome = self.blocked_by_usage(&ticket, usage.records());
            ticket.usage = Some(usage);
            ticket.advance(DeleteFlowState::from_outcome(&outcome))?;
            return Ok(outcome);
        }

        ticket.usage = Some(usage);
        ticket.advance(DeleteFlowState::Deleting)?;

        let outcome = match delete_fn(ticket.entity.key.clone()).await {
            Ok(()) => {
                tracing::info!(
                    "Deleted {} {} ({})",
                    ticket.entity.entity_type,
                    ticket.entity.key,
                    ticket.entity.label
                );
                DeleteOutcome::Deleted {
                    message: deleted_message(ticket.entity_type.noun(), &ticket.entity.label),
                }
            }
            Err(err) => self.interpret_delete_error(&ticket, &err),
        };

        ticket.advance(DeleteFlowState::from_outcome(&outcome))?;
        Ok(outcome)
    }

    /// Abandon a flow. Nothing is deleted.
    pub fn cancel(&self, mut ticket: DeleteTicket) -> Result<(), AppError> {
        ticket.advance(DeleteFlowState::Idle)?;
        tracing::info!(
            "Delete of {} {} cancelled",
            ticket.entity.entity_type,
            ticket.entity.key
        );
        Ok(())
    }

    /// Begin and confirm in one step, deleting through the configured backend.
    pub async fn guarded_delete(&self, entity: Entity) -> Result<DeleteOutcome, AppError> {
        match self.begin_delete(entity).await? {
            DeleteStart::Blocked(outcome) => Ok(outcome),
            DeleteStart::AwaitingConfirmation(ticket) => self.confirm(ticket).await,
        }
    }

    /// Begin and confirm in one step, deleting with `delete_fn`.
    pub async fn guarded_delete_with<F, Fut>(
        &self,
        entity: Entity,
        delete_fn: F,
    ) -> Result<DeleteOutcome, AppError>
    where
        F: FnOnce(EntityKey) -> Fut,
        Fut: Future<Output = Result<(), ResourceError>>,
    {
        match self.begin_delete(entity).await? {
            DeleteStart::Blocked(outcome) => Ok(outcome),
            DeleteStart::AwaitingConfirmation(ticket) => self.confirm_with(ticket, delete_fn).await,
        }
    }

    fn blocked_by_usage(&self, ticket: &DeleteTicket, records: &[DependentRecord]) -> DeleteOutcome {
        tracing::info!(
            "Delete of {} {} blocked: {} dependent record(s)",
            ticket.entity.entity_type,
            ticket.entity.key,
            records.len()
        );
        DeleteOutcome::BlockedByUsage {
            message: blocked_by_usage_message(
                ticket.entity_type.noun(),
                &ticket.entity.label,
                records.len(),
            ),
            records: records.to_vec(),
        }
    }

    /// A 409 or a detail naming an integrity violation means the backend
    /// found references the scanners missed.
    fn interpret_delete_error(&self, ticket: &DeleteTicket, err: &ResourceError) -> DeleteOutcome {
        let noun = ticket.entity_type.noun();
        let label = &ticket.entity.label;

        if self.is_conflict(err) {
            tracing::info!(
                "Delete of {} {} rejected by the backend as still referenced: {}",
                ticket.entity.entity_type,
                ticket.entity.key,
                err
            );
            return DeleteOutcome::BlockedByConstraint {
                message: blocked_by_constraint_message(noun, label),
                status: err.status(),
                detail: err.detail().to_string(),
            };
        }

        tracing::warn!(
            "Delete of {} {} failed: {}",
            ticket.entity.entity_type,
            ticket.entity.key,
            err
        );
        DeleteOutcome::Failed {
            message: failed_message(noun, label, err.status(), err.detail()),
            status: err.status(),
            detail: err.detail().to_string(),
        }
    }

    fn is_conflict(&self, err: &ResourceError) -> bool {
        if err.status() == Some(409) {
            return true;
        }
        let detail = err.detail().to_lowercase();
        self.conflict_markers
            .iter()
            .any(|marker| detail.contains(&marker.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_conflict_markers;
    use crate::resources::MemoryResources;
    use crate::scanners::ScannerRegistry;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn delete_service(resources: Arc<MemoryResources>) -> DeleteService {
        let usage = UsageService::new(
            resources.clone(),
            ScannerRegistry::builtin().unwrap(),
            Duration::from_secs(5),
        );
        DeleteService::new(usage, resources, InFlight::default(), default_conflict_markers())
    }

    fn service_type(key: i64, label: &str) -> Entity {
        Entity::new("service-type", key, label)
    }

    fn status_error(status: u16, detail: &str) -> ResourceError {
        ResourceError::Status {
            resource: "/catalog/service-types".to_string(),
            status,
            detail: detail.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unused_entity_deleted_once() {
        let resources = Arc::new(MemoryResources::new());
        let service = delete_service(resources.clone());

        let outcome = service.guarded_delete(service_type(7, "Fuel")).await.unwrap();

        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                message: "Deleted service type \"Fuel\".".to_string()
            }
        );
        assert_eq!(
            resources.deleted(),
            vec![("/catalog/service-types".to_string(), EntityKey::Number(7))]
        );
    }

    #[tokio::test]
    async fn test_in_use_entity_never_deleted() {
        let resources = Arc::new(MemoryResources::new().with_collection(
            "/catalog/services",
            json!([{"id_service": 1, "service_code": "S1", "service_name": "Towing", "id_service_type": 7}]),
        ));
        let service = delete_service(resources.clone());

        let outcome = service.guarded_delete(service_type(7, "Fuel")).await.unwrap();

        assert!(outcome.is_blocked());
        assert_eq!(
            outcome.message(),
            "Cannot delete service type \"Fuel\" because it is being used by 1 record(s) in the system."
        );
        assert_eq!(outcome.records()[0].name, "S1 - Towing");
        assert!(resources.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_conflict_status_is_blocked() {
        let resources = Arc::new(MemoryResources::new());
        resources.fail_next_delete(status_error(409, "Conflict"));
        let service = delete_service(resources.clone());

        let outcome = service.guarded_delete(service_type(9, "Water")).await.unwrap();

        assert!(matches!(
            outcome,
            DeleteOutcome::BlockedByConstraint {
                status: Some(409),
                ..
            }
        ));
        assert_eq!(
            outcome.message(),
            "Cannot delete service type \"Water\" because it is currently being used in the system."
        );
        assert_eq!(resources.deleted().len(), 1);
    }

    #[tokio::test]
    async fn test_constraint_marker_is_blocked() {
        let resources = Arc::new(MemoryResources::new());
        resources.fail_next_delete(status_error(
            500,
            "IntegrityError: Cannot delete or update a parent row: a FOREIGN KEY CONSTRAINT fails",
        ));
        let service = delete_service(resources);

        let outcome = service.guarded_delete(service_type(9, "Water")).await.unwrap();

        assert!(matches!(outcome, DeleteOutcome::BlockedByConstraint { .. }));
    }

    #[tokio::test]
    async fn test_other_errors_fail_without_retry() {
        let resources = Arc::new(MemoryResources::new());
        resources.fail_next_delete(status_error(500, "Internal Server Error"));
        let service = delete_service(resources.clone());

        let outcome = service.guarded_delete(service_type(9, "Water")).await.unwrap();

        assert_eq!(
            outcome.message(),
            "Could not delete service type \"Water\": (500) Internal Server Error"
        );
        assert!(!outcome.is_blocked());
        assert_eq!(resources.deleted().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_flow_never_deletes() {
        let resources = Arc::new(MemoryResources::new());
        let service = delete_service(resources.clone());

        let ticket = match service.begin_delete(service_type(7, "Fuel")).await.unwrap() {
            DeleteStart::AwaitingConfirmation(ticket) => ticket,
            DeleteStart::Blocked(outcome) => panic!("unexpected block: {:?}", outcome),
        };
        assert_eq!(ticket.state(), &DeleteFlowState::Confirming);
        service.cancel(ticket).unwrap();

        let dropped = service.begin_delete(service_type(7, "Fuel")).await.unwrap();
        drop(dropped);

        assert!(resources.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_reference_added_before_confirm_blocks() {
        let resources = Arc::new(MemoryResources::new());
        let service = delete_service(resources.clone());

        let ticket = match service.begin_delete(service_type(7, "Fuel")).await.unwrap() {
            DeleteStart::AwaitingConfirmation(ticket) => ticket,
            DeleteStart::Blocked(outcome) => panic!("unexpected block: {:?}", outcome),
        };

        resources.insert_collection(
            "/quotes",
            json!([{"id": 31, "quote_number": "Q-31", "service_type_id": 7}]),
        );

        let calls = AtomicUsize::new(0);
        let outcome = service
            .confirm_with(ticket, |_key| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await
            .unwrap();

        assert!(matches!(outcome, DeleteOutcome::BlockedByUsage { .. }));
        assert_eq!(outcome.records()[0].name, "Quote: Q-31");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_flow_for_same_key_rejected() {
        let resources = Arc::new(MemoryResources::new());
        let service = delete_service(resources.clone());

        let first = service.begin_delete(service_type(7, "Fuel")).await.unwrap();
        assert!(matches!(
            service.guarded_delete(service_type(7, "Fuel")).await,
            Err(AppError::DeleteInFlight { .. })
        ));

        // other keys are unaffected
        assert!(service
            .guarded_delete(service_type(8, "Oil"))
            .await
            .unwrap()
            .is_deleted());

        drop(first);
        assert!(service
            .guarded_delete(service_type(7, "Fuel"))
            .await
            .unwrap()
            .is_deleted());
    }

    #[tokio::test]
    async fn test_delete_fn_receives_key() {
        let resources = Arc::new(MemoryResources::new());
        let service = delete_service(resources.clone());

        let outcome = service
            .guarded_delete_with(Entity::new("service-per-customer", "PC-3", "3"), |key| async move {
                assert_eq!(key, EntityKey::from("PC-3"));
                Ok(())
            })
            .await
            .unwrap();

        assert!(outcome.is_deleted());
        assert_eq!(resources.total_fetches(), 0);
        assert!(resources.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_entity_type() {
        let service = delete_service(Arc::new(MemoryResources::new()));
        assert!(matches!(
            service.guarded_delete(Entity::new("aircraft", 1i64, "A")).await,
            Err(AppError::UnknownEntityType(_))
        ));
    }
}
