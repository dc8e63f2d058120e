//! Authorization policy for purchase request actions.
//!
//! Maps (actor role, request snapshot, action) to allowed/denied. Every
//! function here is pure; the persistence layer consults it before each
//! mutation and uses `VisibilityScope` to filter reads.

use serde::{Deserialize, Serialize};
use std::fmt;

use procura_shared::types::{RequestId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::types::RequestStatus;

/// User role in the procurement process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Submits purchase requests.
    #[default]
    Staff,
    /// Decides at approval level 1.
    Approver1,
    /// Decides at approval level 2.
    Approver2,
    /// Validates receipts of approved requests.
    Finance,
    /// Sees everything, may edit or delete any request.
    Admin,
}

impl UserRole {
    /// Every role.
    pub const ALL: [Self; 5] = [
        Self::Staff,
        Self::Approver1,
        Self::Approver2,
        Self::Finance,
        Self::Admin,
    ];

    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "staff" => Some(Self::Staff),
            "approver1" => Some(Self::Approver1),
            "approver2" => Some(Self::Approver2),
            "finance" => Some(Self::Finance),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Approver1 => "approver1",
            Self::Approver2 => "approver2",
            Self::Finance => "finance",
            Self::Admin => "admin",
        }
    }

    /// Returns true for the two approver roles.
    #[must_use]
    pub fn is_approver(&self) -> bool {
        matches!(self, Self::Approver1 | Self::Approver2)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something a user may try to do with a purchase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Submit a new request.
    Create,
    /// Change fields or line items.
    Edit,
    /// Remove the request and everything it owns.
    Delete,
    /// Approve at the current level.
    Approve,
    /// Reject at the current level.
    Reject,
    /// Confirm receipt of an approved request.
    ValidateReceipt,
    /// Read the request.
    View,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ValidateReceipt => "validate receipt for",
            Self::View => "view",
        };
        f.write_str(s)
    }
}

/// The user performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// User identity.
    pub id: UserId,
    /// User role.
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: UserRole) -> Self {
        Self { id, role }
    }
}

/// The parts of a purchase request the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSnapshot {
    /// Request identity.
    pub id: RequestId,
    /// Creator of the request.
    pub created_by: UserId,
    /// Current status.
    pub status: RequestStatus,
}

/// Read-side filter applied to request listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Only requests created by this user.
    CreatedBy(UserId),
    /// Only requests in this status.
    Status(RequestStatus),
    /// Every request.
    All,
}

impl VisibilityScope {
    /// The scope for an actor's role.
    #[must_use]
    pub const fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            UserRole::Staff => Self::CreatedBy(actor.id),
            UserRole::Approver1 => Self::Status(RequestStatus::PendingL1),
            UserRole::Approver2 => Self::Status(RequestStatus::PendingL2),
            UserRole::Finance => Self::Status(RequestStatus::Approved),
            UserRole::Admin => Self::All,
        }
    }

    /// Returns true if the request falls inside the scope.
    #[must_use]
    pub fn permits(&self, request: &RequestSnapshot) -> bool {
        match self {
            Self::CreatedBy(user) => request.created_by == *user,
            Self::Status(status) => request.status == *status,
            Self::All => true,
        }
    }
}

/// Stateless authorization policy.
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    /// Whether `actor` may perform `action` on `request`.
    #[must_use]
    pub fn can_act(actor: &Actor, request: &RequestSnapshot, action: Action) -> bool {
        let is_owner_or_admin =
            request.created_by == actor.id || actor.role == UserRole::Admin;

        match action {
            Action::Approve | Action::Reject => request
                .status
                .pending_level()
                .is_some_and(|level| level.required_role() == actor.role),
            Action::ValidateReceipt => {
                actor.role == UserRole::Finance && request.status == RequestStatus::Approved
            }
            Action::Edit => is_owner_or_admin && request.status == RequestStatus::PendingL1,
            Action::Delete => is_owner_or_admin,
            Action::Create => Self::can_create(actor),
            Action::View => VisibilityScope::for_actor(actor).permits(request),
        }
    }

    /// Whether `actor` may submit new requests.
    #[must_use]
    pub fn can_create(actor: &Actor) -> bool {
        matches!(actor.role, UserRole::Staff | UserRole::Admin)
    }

    /// Whether `actor` may list the requests they decided on.
    #[must_use]
    pub fn can_review_decisions(actor: &Actor) -> bool {
        matches!(
            actor.role,
            UserRole::Approver1 | UserRole::Approver2 | UserRole::Admin
        )
    }

    /// Like `can_act`, but returns `NotAuthorized` on denial.
    pub fn authorize(
        actor: &Actor,
        request: &RequestSnapshot,
        action: Action,
    ) -> Result<(), WorkflowError> {
        if Self::can_act(actor, request, action) {
            Ok(())
        } else {
            Err(WorkflowError::NotAuthorized {
                role: actor.role,
                action,
            })
        }
    }
}
