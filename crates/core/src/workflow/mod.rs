//! Purchase request workflow management for Procura.
//!
//! This module implements the request lifecycle state machine and the
//! authorization policy that gates it.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (RequestStatus, ApprovalLevel, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic
//! - `policy` - Roles, actions, and the authorization policy

pub mod error;
pub mod policy;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use policy::{Action, Actor, AuthorizationPolicy, RequestSnapshot, UserRole, VisibilityScope};
pub use service::LifecycleEngine;
pub use types::{
    ApprovalLevel, ApprovalOutcome, Decision, ReceiptStatus, RequestStatus, WorkflowAction,
};
