//! Conversions between database enums and core domain types.

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, SqlErr};

use procura_core::workflow::{
    Actor, ApprovalOutcome, ReceiptStatus as CoreReceiptStatus, RequestSnapshot,
    RequestStatus as CoreStatus, UserRole as CoreRole, WorkflowError,
};
use procura_shared::types::{RequestId, UserId};

use crate::entities::{
    purchase_requests,
    sea_orm_active_enums::{ApprovalDecision, ReceiptStatus, RequestStatus, UserRole},
    users,
};

/// Converts DB status enum to core status enum.
pub(crate) const fn db_status_to_core(status: RequestStatus) -> CoreStatus {
    match status {
        RequestStatus::PendingL1 => CoreStatus::PendingL1,
        RequestStatus::RejectedL1 => CoreStatus::RejectedL1,
        RequestStatus::PendingL2 => CoreStatus::PendingL2,
        RequestStatus::RejectedL2 => CoreStatus::RejectedL2,
        RequestStatus::Approved => CoreStatus::Approved,
        RequestStatus::Ordered => CoreStatus::Ordered,
        RequestStatus::Delivered => CoreStatus::Delivered,
        RequestStatus::Completed => CoreStatus::Completed,
    }
}

/// Converts core status enum to DB status enum.
pub(crate) const fn core_status_to_db(status: CoreStatus) -> RequestStatus {
    match status {
        CoreStatus::PendingL1 => RequestStatus::PendingL1,
        CoreStatus::RejectedL1 => RequestStatus::RejectedL1,
        CoreStatus::PendingL2 => RequestStatus::PendingL2,
        CoreStatus::RejectedL2 => RequestStatus::RejectedL2,
        CoreStatus::Approved => RequestStatus::Approved,
        CoreStatus::Ordered => RequestStatus::Ordered,
        CoreStatus::Delivered => RequestStatus::Delivered,
        CoreStatus::Completed => RequestStatus::Completed,
    }
}

pub(crate) const fn db_role_to_core(role: UserRole) -> CoreRole {
    match role {
        UserRole::Staff => CoreRole::Staff,
        UserRole::Approver1 => CoreRole::Approver1,
        UserRole::Approver2 => CoreRole::Approver2,
        UserRole::Finance => CoreRole::Finance,
        UserRole::Admin => CoreRole::Admin,
    }
}

pub(crate) const fn core_role_to_db(role: CoreRole) -> UserRole {
    match role {
        CoreRole::Staff => UserRole::Staff,
        CoreRole::Approver1 => UserRole::Approver1,
        CoreRole::Approver2 => UserRole::Approver2,
        CoreRole::Finance => UserRole::Finance,
        CoreRole::Admin => UserRole::Admin,
    }
}

pub(crate) const fn outcome_to_db(outcome: ApprovalOutcome) -> ApprovalDecision {
    match outcome {
        ApprovalOutcome::Approved => ApprovalDecision::Approved,
        ApprovalOutcome::Rejected => ApprovalDecision::Rejected,
    }
}

pub(crate) const fn receipt_status_to_db(status: CoreReceiptStatus) -> ReceiptStatus {
    match status {
        CoreReceiptStatus::Received => ReceiptStatus::Received,
        CoreReceiptStatus::PartiallyReceived => ReceiptStatus::PartiallyReceived,
        CoreReceiptStatus::NotReceived => ReceiptStatus::NotReceived,
    }
}

/// Policy view of a stored request.
pub(crate) fn snapshot(request: &purchase_requests::Model) -> RequestSnapshot {
    RequestSnapshot {
        id: RequestId::from_uuid(request.id),
        created_by: UserId::from_uuid(request.created_by),
        status: db_status_to_core(request.status),
    }
}

pub(crate) fn db_err(e: DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

/// True for unique and primary key violations on any backend.
pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Loads the acting user.
pub(crate) async fn load_actor<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<Actor, WorkflowError> {
    let user = users::Entity::find_by_id(user_id.into_inner())
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(WorkflowError::UserNotFound(user_id.into_inner()))?;

    Ok(Actor::new(UserId::from_uuid(user.id), db_role_to_core(user.role)))
}

/// Loads a request by id.
pub(crate) async fn load_request<C: ConnectionTrait>(
    conn: &C,
    request_id: RequestId,
) -> Result<purchase_requests::Model, WorkflowError> {
    purchase_requests::Entity::find_by_id(request_id.into_inner())
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(WorkflowError::RequestNotFound(request_id.into_inner()))
}
