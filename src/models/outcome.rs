//! Outcomes of guarded deletes and key-field edits, plus the messages
//! shown to the user for each.

use serde::Serialize;

use super::DependentRecord;

/// Terminal outcome of a guarded delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The usage check found referencing records. Delete was not attempted.
    BlockedByUsage {
        message: String,
        records: Vec<DependentRecord>,
    },
    /// The backend rejected the delete with an integrity violation.
    BlockedByConstraint {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        detail: String,
    },
    /// The record was deleted.
    Deleted { message: String },
    /// The delete failed for an unrelated reason. Not retried.
    Failed {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        detail: String,
    },
}

impl DeleteOutcome {
    /// Blocked by either the client-side scan or the backend constraint.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            DeleteOutcome::BlockedByUsage { .. } | DeleteOutcome::BlockedByConstraint { .. }
        )
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            DeleteOutcome::BlockedByUsage { message, .. }
            | DeleteOutcome::BlockedByConstraint { message, .. }
            | DeleteOutcome::Deleted { message }
            | DeleteOutcome::Failed { message, .. } => message,
        }
    }

    /// Referencing records, when the scan found them. A constraint block
    /// carries none because the scan reported the entity as unused.
    pub fn records(&self) -> &[DependentRecord] {
        match self {
            DeleteOutcome::BlockedByUsage { records, .. } => records,
            _ => &[],
        }
    }
}

/// Decision for an edit that may touch key fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum EditDecision {
    Allowed,
    Blocked {
        message: String,
        records: Vec<DependentRecord>,
    },
}

impl EditDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EditDecision::Allowed)
    }
}

// ============================================================================
// Messages
// ============================================================================

pub fn blocked_by_usage_message(noun: &str, label: &str, count: usize) -> String {
    format!(
        "Cannot delete {} \"{}\" because it is being used by {} record(s) in the system.",
        noun, label, count
    )
}

pub fn blocked_by_constraint_message(noun: &str, label: &str) -> String {
    format!(
        "Cannot delete {} \"{}\" because it is currently being used in the system.",
        noun, label
    )
}

pub fn deleted_message(noun: &str, label: &str) -> String {
    format!("Deleted {} \"{}\".", noun, label)
}

pub fn failed_message(noun: &str, label: &str, status: Option<u16>, detail: &str) -> String {
    match status {
        Some(status) => format!(
            "Could not delete {} \"{}\": ({}) {}",
            noun, label, status, detail
        ),
        None => format!("Could not delete {} \"{}\": {}", noun, label, detail),
    }
}

pub fn edit_blocked_message(noun: &str, label: &str, count: usize) -> String {
    let mut noun = noun.to_string();
    if let Some(first) = noun.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!(
        "{} \"{}\" is used by {} record(s) and its key fields cannot be modified.",
        noun, label, count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constraint_block_counts_as_blocked() {
        let outcome = DeleteOutcome::BlockedByConstraint {
            message: blocked_by_constraint_message("service type", "Fuel"),
            status: Some(409),
            detail: String::new(),
        };
        assert!(outcome.is_blocked());
        assert!(!outcome.is_deleted());
        assert!(outcome.records().is_empty());
    }

    #[test]
    fn test_usage_message_embeds_label_and_count() {
        let msg = blocked_by_usage_message("service classification", "Cabin", 3);
        assert_eq!(
            msg,
            "Cannot delete service classification \"Cabin\" because it is being used by 3 record(s) in the system."
        );
    }

    #[test]
    fn test_failed_message_with_and_without_status() {
        assert_eq!(
            failed_message("service include", "Water", Some(500), "boom"),
            "Could not delete service include \"Water\": (500) boom"
        );
        assert_eq!(
            failed_message("service include", "Water", None, "timed out"),
            "Could not delete service include \"Water\": timed out"
        );
    }

    #[test]
    fn test_edit_message_capitalizes_noun() {
        assert_eq!(
            edit_blocked_message("service per customer", "12", 1),
            "Service per customer \"12\" is used by 1 record(s) and its key fields cannot be modified."
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = DeleteOutcome::Deleted {
            message: "Deleted service type \"Fuel\".".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], json!("deleted"));

        let failed = DeleteOutcome::Failed {
            message: "x".to_string(),
            status: None,
            detail: "y".to_string(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert!(value.get("status").is_none());
    }
}
