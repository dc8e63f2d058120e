//! Lifecycle engine for purchase request state transitions.
//!
//! This module implements the transition table of the approval workflow.
//! It validates a requested transition against the current status and the
//! actor's role and returns the `WorkflowAction` to persist; it never touches
//! storage itself.

use chrono::Utc;

use crate::workflow::error::WorkflowError;
use crate::workflow::policy::{Action, Actor, UserRole};
use crate::workflow::types::{Decision, ReceiptStatus, RequestStatus, WorkflowAction};

/// Stateless service for purchase request lifecycle transitions.
pub struct LifecycleEngine;

impl LifecycleEngine {
    /// Validate an approve or reject decision at the request's current level.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the request
    /// * `actor` - The user deciding
    /// * `decision` - Approve or reject
    /// * `comment` - Optional approver comment
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Decide)` if the transition is valid
    /// * `Err(WorkflowError::InvalidState)` if no level is pending, or the
    ///   actor's own level has already been decided
    /// * `Err(WorkflowError::NotAuthorized)` if the actor's role is not the
    ///   approver role for the pending level
    pub fn decide(
        current_status: RequestStatus,
        actor: &Actor,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        let action = decision.action();
        let Some(level) = current_status.pending_level() else {
            return Err(WorkflowError::InvalidState {
                status: current_status,
                action,
            });
        };

        if actor.role != level.required_role() {
            // approver1 on a pending_l2 request: their gate is already closed
            let already_decided = matches!(
                (actor.role, current_status),
                (UserRole::Approver1, RequestStatus::PendingL2)
            );
            return Err(if already_decided {
                WorkflowError::InvalidState {
                    status: current_status,
                    action,
                }
            } else {
                WorkflowError::NotAuthorized {
                    role: actor.role,
                    action,
                }
            });
        }

        let new_status = match decision {
            Decision::Approve => level.approved_status(),
            Decision::Reject => level.rejected_status(),
        };

        Ok(WorkflowAction::Decide {
            level,
            outcome: decision.outcome(),
            from_status: current_status,
            new_status,
            decided_by: actor.id,
            decided_at: Utc::now(),
            comment: comment.unwrap_or_default(),
        })
    }

    /// Validate finance's receipt confirmation of an approved request.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::ValidateReceipt)` if the transition is valid
    /// * `Err(WorkflowError::InvalidState)` if the request is not approved
    /// * `Err(WorkflowError::NotAuthorized)` if the actor is not finance
    pub fn validate_receipt(
        current_status: RequestStatus,
        actor: &Actor,
        receipt_status: ReceiptStatus,
        comment: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        if current_status != RequestStatus::Approved {
            return Err(WorkflowError::InvalidState {
                status: current_status,
                action: Action::ValidateReceipt,
            });
        }

        if actor.role != UserRole::Finance {
            return Err(WorkflowError::NotAuthorized {
                role: actor.role,
                action: Action::ValidateReceipt,
            });
        }

        Ok(WorkflowAction::ValidateReceipt {
            new_status: RequestStatus::Completed,
            validated_by: actor.id,
            validated_at: Utc::now(),
            receipt_status,
            comment: comment.unwrap_or_default(),
        })
    }

    /// Whether fields and line items may still change.
    #[must_use]
    pub fn can_edit(status: RequestStatus) -> bool {
        status == RequestStatus::PendingL1
    }

    /// Fails with `InvalidState` unless the request is still editable.
    pub fn ensure_editable(status: RequestStatus) -> Result<(), WorkflowError> {
        if Self::can_edit(status) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                status,
                action: Action::Edit,
            })
        }
    }

    /// Check if a status transition is owned by this engine.
    ///
    /// Valid transitions:
    /// - PendingL1 → PendingL2 | RejectedL1
    /// - PendingL2 → Approved | RejectedL2
    /// - Approved → Completed
    #[must_use]
    pub fn is_valid_transition(from: RequestStatus, to: RequestStatus) -> bool {
        matches!(
            (from, to),
            (
                RequestStatus::PendingL1,
                RequestStatus::PendingL2 | RequestStatus::RejectedL1
            ) | (
                RequestStatus::PendingL2,
                RequestStatus::Approved | RequestStatus::RejectedL2
            ) | (RequestStatus::Approved, RequestStatus::Completed)
        )
    }
}
