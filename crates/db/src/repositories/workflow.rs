//! Workflow repository for purchase request state transitions.
//!
//! Each transition runs in one database transaction: read the request and
//! the actor, run the pure guard from `procura_core`, insert the audit row,
//! then move the status with a write conditioned on the status that was
//! read. The unique index on `approvals (request_id, level)` and the
//! conditional write together let exactly one of two concurrent deciders
//! through; the other gets `InvalidState` and leaves nothing behind.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};

use procura_core::workflow::{
    Action, Decision, LifecycleEngine, ReceiptStatus, RequestStatus as CoreStatus,
    WorkflowAction, WorkflowError,
};
use procura_shared::types::{ApprovalId, ReceiptValidationId, RequestId, UserId};

use super::convert::{
    core_status_to_db, db_err, db_status_to_core, is_unique_violation, load_actor, load_request,
    outcome_to_db, receipt_status_to_db,
};
use crate::entities::{approvals, purchase_requests, receipt_validations};

/// Result of a successful approve or reject.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// The request after the transition.
    pub request: purchase_requests::Model,
    /// The approval row that was recorded.
    pub approval: approvals::Model,
}

/// Result of a successful receipt validation.
#[derive(Debug, Clone)]
pub struct ReceiptOutcome {
    /// The request after the transition, now `completed`.
    pub request: purchase_requests::Model,
    /// The receipt validation row that was recorded.
    pub validation: receipt_validations::Model,
}

/// Workflow repository for purchase request state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Approves or rejects a request at its pending level.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Request or actor is not found
    /// - Request is not pending at any level, or the actor's level has
    ///   already been decided (`InvalidState`)
    /// - Actor's role is not the approver role for the pending level
    ///   (`NotAuthorized`)
    /// - A concurrent decision for the same level committed first
    ///   (`InvalidState`)
    /// - Database operation fails
    pub async fn decide(
        &self,
        request_id: RequestId,
        actor_id: UserId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<DecisionOutcome, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let request = load_request(&txn, request_id).await?;
        let actor = load_actor(&txn, actor_id).await?;
        let observed = db_status_to_core(request.status);

        let action = LifecycleEngine::decide(observed, &actor, decision, comment).inspect_err(
            |e| warn!(request_id = %request.id, user_id = %actor_id, error = %e, "decision denied"),
        )?;
        let WorkflowAction::Decide {
            level,
            outcome,
            new_status,
            decided_at,
            comment,
            ..
        } = action
        else {
            return Err(invalid_state(observed, decision.action()));
        };

        let approval = approvals::ActiveModel {
            id: Set(ApprovalId::new().into_inner()),
            request_id: Set(request.id),
            approver_id: Set(actor_id.into_inner()),
            level: Set(level.as_i16()),
            decision: Set(outcome_to_db(outcome)),
            comment: Set(comment),
            decided_at: Set(decided_at.into()),
        };
        let approval = match approval.insert(&txn).await {
            Ok(approval) => approval,
            Err(e) if is_unique_violation(&e) => {
                warn!(request_id = %request.id, %level, "decision lost race: level already decided");
                return Err(invalid_state(observed, decision.action()));
            }
            Err(e) => return Err(db_err(e)),
        };

        let request = move_status(&txn, request_id, observed, new_status)
            .await?
            .ok_or_else(|| {
                warn!(request_id = %request.id, "decision lost race: status changed");
                invalid_state(observed, decision.action())
            })?;

        txn.commit().await.map_err(db_err)?;

        info!(
            request_id = %request.id,
            %level,
            decision = outcome.as_str(),
            from = %observed,
            to = %new_status,
            decided_by = %actor_id,
            "request decided"
        );

        Ok(DecisionOutcome { request, approval })
    }

    /// Records finance's receipt validation and completes the request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Request or actor is not found
    /// - Request is not `approved` (`InvalidState`)
    /// - Actor is not finance (`NotAuthorized`)
    /// - A concurrent validation committed first (`InvalidState`)
    /// - Database operation fails
    pub async fn validate_receipt(
        &self,
        request_id: RequestId,
        finance_user_id: UserId,
        receipt_status: ReceiptStatus,
        comment: Option<String>,
    ) -> Result<ReceiptOutcome, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let request = load_request(&txn, request_id).await?;
        let actor = load_actor(&txn, finance_user_id).await?;
        let observed = db_status_to_core(request.status);

        let action = LifecycleEngine::validate_receipt(observed, &actor, receipt_status, comment)
            .inspect_err(|e| {
                warn!(request_id = %request.id, user_id = %finance_user_id, error = %e, "receipt validation denied");
            })?;
        let WorkflowAction::ValidateReceipt {
            new_status,
            validated_at,
            comment,
            ..
        } = action
        else {
            return Err(invalid_state(observed, Action::ValidateReceipt));
        };

        let validation = receipt_validations::ActiveModel {
            id: Set(ReceiptValidationId::new().into_inner()),
            request_id: Set(request.id),
            validated_by: Set(finance_user_id.into_inner()),
            receipt_status: Set(receipt_status_to_db(receipt_status)),
            comment: Set(comment),
            validated_at: Set(validated_at.into()),
        };
        let validation = match validation.insert(&txn).await {
            Ok(validation) => validation,
            Err(e) if is_unique_violation(&e) => {
                warn!(request_id = %request.id, "receipt validation lost race");
                return Err(invalid_state(observed, Action::ValidateReceipt));
            }
            Err(e) => return Err(db_err(e)),
        };

        let request = move_status(&txn, request_id, observed, new_status)
            .await?
            .ok_or_else(|| {
                warn!(request_id = %request.id, "receipt validation lost race: status changed");
                invalid_state(observed, Action::ValidateReceipt)
            })?;

        txn.commit().await.map_err(db_err)?;

        info!(
            request_id = %request.id,
            receipt_status = receipt_status.as_str(),
            to = %new_status,
            validated_by = %finance_user_id,
            "receipt validated"
        );

        Ok(ReceiptOutcome {
            request,
            validation,
        })
    }

    /// Finds the receipt validation of a request, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_receipt_validation(
        &self,
        request_id: RequestId,
    ) -> Result<Option<receipt_validations::Model>, WorkflowError> {
        receipt_validations::Entity::find()
            .filter(receipt_validations::Column::RequestId.eq(request_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

/// Writes `to` only if the row still has status `from`. Returns the updated
/// row, or `None` if another writer moved the status first.
async fn move_status(
    txn: &DatabaseTransaction,
    request_id: RequestId,
    from: CoreStatus,
    to: CoreStatus,
) -> Result<Option<purchase_requests::Model>, WorkflowError> {
    let result = purchase_requests::Entity::update_many()
        .set(purchase_requests::ActiveModel {
            status: Set(core_status_to_db(to)),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        })
        .filter(purchase_requests::Column::Id.eq(request_id.into_inner()))
        .filter(purchase_requests::Column::Status.eq(core_status_to_db(from)))
        .exec(txn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    load_request(txn, request_id).await.map(Some)
}

const fn invalid_state(status: CoreStatus, action: Action) -> WorkflowError {
    WorkflowError::InvalidState { status, action }
}
