//! Domain models for the usage guard.

mod entity;
mod flow;
mod outcome;
mod record;
mod usage;

pub use entity::{Entity, EntityKey};
pub use flow::DeleteFlowState;
pub use outcome::{
    blocked_by_constraint_message, blocked_by_usage_message, deleted_message,
    edit_blocked_message, failed_message, DeleteOutcome, EditDecision,
};
pub use record::{is_truthy, render_value, Record};
pub use usage::{DependentRecord, ScannerState, ScannerStatus, UsageResult};
