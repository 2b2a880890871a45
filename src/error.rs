//! Application error types.
//!
//! Two families live here:
//! - [`AppError`] for failures the caller has to handle (bad configuration,
//!   unknown entity types, a second delete flow for the same record).
//! - [`ResourceError`] for failures reported by a catalog backend. These
//!   never escape the guard as `AppError`: scanner failures become a
//!   [`ScannerState`](crate::models::ScannerState) and delete failures become a
//!   [`DeleteOutcome`](crate::models::DeleteOutcome).

use thiserror::Error;

/// Application-level errors for the usage guard.
#[derive(Error, Debug)]
pub enum AppError {
    // Transport setup errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    // Registry errors
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Invalid scanner for {resource}: {reason}")]
    InvalidScanner { resource: String, reason: String },

    // Flow errors
    #[error("A delete is already in progress for {entity_type} {key}")]
    DeleteInFlight { entity_type: String, key: String },

    #[error("Delete flow closed: {0}")]
    FlowClosed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl AppError {
    /// Short machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Resource(_) => "RESOURCE_ERROR",
            AppError::UnknownEntityType(_) => "UNKNOWN_ENTITY_TYPE",
            AppError::InvalidScanner { .. } => "INVALID_SCANNER",
            AppError::DeleteInFlight { .. } => "DELETE_IN_FLIGHT",
            AppError::FlowClosed(_) => "FLOW_CLOSED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Fixture(_) => "FIXTURE_ERROR",
        }
    }
}

/// Failure reported while reading from or deleting in a catalog backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Request to {resource} failed: {message}")]
    Transport { resource: String, message: String },

    /// The backend answered with a non-2xx status.
    #[error("{resource} returned HTTP {status}: {detail}")]
    Status {
        resource: String,
        status: u16,
        detail: String,
    },

    /// The backend answered 2xx but the body is not a record collection.
    #[error("{resource} returned an unreadable payload: {message}")]
    Payload { resource: String, message: String },
}

impl ResourceError {
    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Free-text description of the failure.
    ///
    /// For status errors this is the backend's `detail`, which is where
    /// integrity violations are reported.
    pub fn detail(&self) -> &str {
        match self {
            ResourceError::Transport { message, .. } => message,
            ResourceError::Status { detail, .. } => detail,
            ResourceError::Payload { message, .. } => message,
        }
    }

    /// Resource path the failing request targeted.
    pub fn resource(&self) -> &str {
        match self {
            ResourceError::Transport { resource, .. }
            | ResourceError::Status { resource, .. }
            | ResourceError::Payload { resource, .. } => resource,
        }
    }
}
