//! Workflow error types for purchase request lifecycle management.
//!
//! Every failure of a lifecycle or policy check is returned to the caller
//! as one of these variants; nothing is retried or swallowed.

use thiserror::Error;
use uuid::Uuid;

use procura_shared::AppError;

use crate::workflow::policy::{Action, UserRole};
use crate::workflow::types::RequestStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The acting user's role or ownership does not allow the action.
    #[error("Role {role} is not authorized to {action} this request")]
    NotAuthorized {
        /// The acting user's role.
        role: UserRole,
        /// The attempted action.
        action: Action,
    },

    /// The action is not valid for the request's current status.
    ///
    /// Also returned when a concurrent decision won the race.
    #[error("Cannot {action} a request in status {status}")]
    InvalidState {
        /// The status observed when the action was attempted.
        status: RequestStatus,
        /// The attempted action.
        action: Action,
    },

    /// Purchase request not found.
    #[error("Purchase request {0} not found")]
    RequestNotFound(Uuid),

    /// User not found.
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// Line item not found on the request.
    #[error("Request item {0} not found")]
    ItemNotFound(Uuid),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Shorthand for a validation failure.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotAuthorized { .. } => 403,
            Self::RequestNotFound(_) | Self::UserNotFound(_) | Self::ItemNotFound(_) => 404,
            Self::InvalidState { .. } => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let msg = err.to_string();
        match err {
            WorkflowError::NotAuthorized { .. } => Self::Forbidden(msg),
            WorkflowError::InvalidState { .. } => Self::InvalidState(msg),
            WorkflowError::RequestNotFound(_)
            | WorkflowError::UserNotFound(_)
            | WorkflowError::ItemNotFound(_) => Self::NotFound(msg),
            WorkflowError::Validation(_) => Self::Validation(msg),
            WorkflowError::Database(_) => Self::Database(msg),
        }
    }
}
