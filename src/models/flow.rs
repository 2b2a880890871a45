//! Delete flow state.
//!
//! One value describes where a delete attempt stands, replacing a set of
//! independent flags that could disagree with each other:
//!
//! ```text
//! Idle -> Checking -> Confirming -> Checking -> Deleting -> Succeeded
//!             |           |             |           |
//!             v           v             v           v
//!          Blocked       Idle        Blocked   Blocked | Failed
//! ```
//!
//! `Confirming -> Idle` is the user abandoning the confirmation.

use serde::Serialize;

use super::{DeleteOutcome, DependentRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeleteFlowState {
    Idle,
    Checking,
    Confirming,
    Deleting,
    Blocked {
        message: String,
        records: Vec<DependentRecord>,
    },
    Succeeded {
        message: String,
    },
    Failed {
        message: String,
    },
}

impl DeleteFlowState {
    /// The flow has ended and holds a message for the user.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeleteFlowState::Blocked { .. }
                | DeleteFlowState::Succeeded { .. }
                | DeleteFlowState::Failed { .. }
        )
    }

    /// A check or delete is running; no delete action may be offered.
    pub fn is_busy(&self) -> bool {
        matches!(self, DeleteFlowState::Checking | DeleteFlowState::Deleting)
    }

    /// Whether moving from `self` to `next` is a legal step.
    pub fn allows(&self, next: &DeleteFlowState) -> bool {
        use DeleteFlowState::*;
        match (self, next) {
            (Idle, Checking) => true,
            (Checking, Confirming | Deleting | Blocked { .. }) => true,
            (Confirming, Checking | Idle) => true,
            (Deleting, Succeeded { .. } | Blocked { .. } | Failed { .. }) => true,
            _ => false,
        }
    }

    /// Terminal state matching a delete outcome.
    pub fn from_outcome(outcome: &DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::BlockedByUsage { message, records } => DeleteFlowState::Blocked {
                message: message.clone(),
                records: records.clone(),
            },
            DeleteOutcome::BlockedByConstraint { message, .. } => DeleteFlowState::Blocked {
                message: message.clone(),
                records: Vec::new(),
            },
            DeleteOutcome::Deleted { message } => DeleteFlowState::Succeeded {
                message: message.clone(),
            },
            DeleteOutcome::Failed { message, .. } => DeleteFlowState::Failed {
                message: message.clone(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeleteFlowState::Idle => "idle",
            DeleteFlowState::Checking => "checking",
            DeleteFlowState::Confirming => "confirming",
            DeleteFlowState::Deleting => "deleting",
            DeleteFlowState::Blocked { .. } => "blocked",
            DeleteFlowState::Succeeded { .. } => "succeeded",
            DeleteFlowState::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            DeleteFlowState::Idle,
            DeleteFlowState::Checking,
            DeleteFlowState::Confirming,
            DeleteFlowState::Checking,
            DeleteFlowState::Deleting,
            DeleteFlowState::Succeeded {
                message: "ok".to_string(),
            },
        ];
        for pair in path.windows(2) {
            assert!(pair[0].allows(&pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_cannot_delete_without_check() {
        assert!(!DeleteFlowState::Idle.allows(&DeleteFlowState::Deleting));
        assert!(!DeleteFlowState::Confirming.allows(&DeleteFlowState::Deleting));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let done = DeleteFlowState::Failed {
            message: "x".to_string(),
        };
        assert!(done.is_terminal());
        assert!(!done.allows(&DeleteFlowState::Checking));
        assert!(!done.is_busy());
    }

    #[test]
    fn test_busy_states() {
        assert!(DeleteFlowState::Checking.is_busy());
        assert!(DeleteFlowState::Deleting.is_busy());
        assert!(!DeleteFlowState::Confirming.is_busy());
    }

    #[test]
    fn test_from_constraint_outcome() {
        let state = DeleteFlowState::from_outcome(&DeleteOutcome::BlockedByConstraint {
            message: "in use".to_string(),
            status: Some(409),
            detail: String::new(),
        });
        assert_eq!(state.name(), "blocked");
    }
}
