//! Workflow domain types for purchase request lifecycle management.
//!
//! This module defines the request status enum, the two approval levels,
//! approver decisions, receipt statuses, and the `WorkflowAction` value that
//! describes a validated transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use procura_shared::types::UserId;

use crate::workflow::policy::{Action, UserRole};

/// Purchase request status in the approval workflow.
///
/// Requests progress through these states from creation to completion.
/// The transitions owned by the lifecycle engine are:
/// - PendingL1 → PendingL2 (level-1 approve)
/// - PendingL1 → RejectedL1 (level-1 reject)
/// - PendingL2 → Approved (level-2 approve)
/// - PendingL2 → RejectedL2 (level-2 reject)
/// - Approved → Completed (receipt validation)
///
/// `Ordered` and `Delivered` are set by collaborators outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for the level-1 approver. The only editable state.
    PendingL1,
    /// Rejected by the level-1 approver (terminal).
    RejectedL1,
    /// Waiting for the level-2 approver.
    PendingL2,
    /// Rejected by the level-2 approver (terminal).
    RejectedL2,
    /// Passed both approval levels; awaiting receipt validation.
    Approved,
    /// Purchase order placed.
    Ordered,
    /// Goods or services delivered.
    Delivered,
    /// Receipt validated by finance (terminal).
    Completed,
}

impl RequestStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::PendingL1,
        Self::RejectedL1,
        Self::PendingL2,
        Self::RejectedL2,
        Self::Approved,
        Self::Ordered,
        Self::Delivered,
        Self::Completed,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingL1 => "pending_l1",
            Self::RejectedL1 => "rejected_l1",
            Self::PendingL2 => "pending_l2",
            Self::RejectedL2 => "rejected_l2",
            Self::Approved => "approved",
            Self::Ordered => "ordered",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending_l1" => Some(Self::PendingL1),
            "rejected_l1" => Some(Self::RejectedL1),
            "pending_l2" => Some(Self::PendingL2),
            "rejected_l2" => Some(Self::RejectedL2),
            "approved" => Some(Self::Approved),
            "ordered" => Some(Self::Ordered),
            "delivered" => Some(Self::Delivered),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// The approval level waiting on a decision, if any.
    #[must_use]
    pub fn pending_level(&self) -> Option<ApprovalLevel> {
        match self {
            Self::PendingL1 => Some(ApprovalLevel::First),
            Self::PendingL2 => Some(ApprovalLevel::Second),
            _ => None,
        }
    }

    /// Returns true if no transition leaves this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RejectedL1 | Self::RejectedL2 | Self::Completed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the two sequential approval gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApprovalLevel {
    /// Level 1, decided by `approver1`.
    First = 1,
    /// Level 2, decided by `approver2`.
    Second = 2,
}

impl ApprovalLevel {
    /// Numeric level as stored on approval records.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        self as i16
    }

    /// Parses a stored level number.
    #[must_use]
    pub const fn from_i16(level: i16) -> Option<Self> {
        match level {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            _ => None,
        }
    }

    /// The role allowed to decide at this level.
    #[must_use]
    pub const fn required_role(self) -> UserRole {
        match self {
            Self::First => UserRole::Approver1,
            Self::Second => UserRole::Approver2,
        }
    }

    /// Status a request moves to when approved at this level.
    #[must_use]
    pub const fn approved_status(self) -> RequestStatus {
        match self {
            Self::First => RequestStatus::PendingL2,
            Self::Second => RequestStatus::Approved,
        }
    }

    /// Status a request moves to when rejected at this level.
    #[must_use]
    pub const fn rejected_status(self) -> RequestStatus {
        match self {
            Self::First => RequestStatus::RejectedL1,
            Self::Second => RequestStatus::RejectedL2,
        }
    }
}

impl fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.as_i16())
    }
}

/// The action an approver takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Let the request through this level.
    Approve,
    /// Stop the request at this level.
    Reject,
}

impl Decision {
    /// The recorded outcome of this decision.
    #[must_use]
    pub const fn outcome(self) -> ApprovalOutcome {
        match self {
            Self::Approve => ApprovalOutcome::Approved,
            Self::Reject => ApprovalOutcome::Rejected,
        }
    }

    /// The policy action this decision corresponds to.
    #[must_use]
    pub const fn action(self) -> Action {
        match self {
            Self::Approve => Action::Approve,
            Self::Reject => Action::Reject,
        }
    }
}

/// Outcome stored on an approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalOutcome {
    /// The approver let the request through.
    Approved,
    /// The approver stopped the request.
    Rejected,
}

impl ApprovalOutcome {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Receipt status recorded by finance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Everything ordered arrived.
    Received,
    /// Some of the order arrived.
    PartiallyReceived,
    /// Nothing arrived.
    NotReceived,
}

impl ReceiptStatus {
    /// Returns the string representation of the receipt status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::PartiallyReceived => "partially_received",
            Self::NotReceived => "not_received",
        }
    }

    /// Parses a receipt status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "received" => Some(Self::Received),
            "partially_received" => Some(Self::PartiallyReceived),
            "not_received" => Some(Self::NotReceived),
            _ => None,
        }
    }
}

/// Workflow action representing a validated state transition with audit data.
///
/// Produced by `LifecycleEngine`; the persistence layer applies it.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// An approver decided at one level.
    Decide {
        /// The level being decided.
        level: ApprovalLevel,
        /// The recorded outcome.
        outcome: ApprovalOutcome,
        /// The status the request was in when the decision was validated.
        from_status: RequestStatus,
        /// The new status after the decision.
        new_status: RequestStatus,
        /// The approver.
        decided_by: UserId,
        /// When the decision was taken.
        decided_at: DateTime<Utc>,
        /// Approver comment, empty when none was given.
        comment: String,
    },
    /// Finance confirmed receipt of an approved request.
    ValidateReceipt {
        /// The new status after validation.
        new_status: RequestStatus,
        /// The finance user.
        validated_by: UserId,
        /// When the receipt was validated.
        validated_at: DateTime<Utc>,
        /// What was received.
        receipt_status: ReceiptStatus,
        /// Finance comment, empty when none was given.
        comment: String,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> RequestStatus {
        match self {
            Self::Decide { new_status, .. } | Self::ValidateReceipt { new_status, .. } => {
                *new_status
            }
        }
    }
}
