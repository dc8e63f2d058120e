//! Integration tests for the workflow repository.
//!
//! Covers every transition of the request lifecycle, the per-level
//! uniqueness of approvals and concurrent deciders.

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use procura_core::workflow::{
    Action, Decision, ReceiptStatus, RequestStatus as CoreStatus, UserRole, WorkflowError,
};
use procura_db::WorkflowRepository;
use procura_db::entities::{
    approvals, receipt_validations,
    sea_orm_active_enums::{ApprovalDecision, ReceiptStatus as DbReceiptStatus, RequestStatus},
};
use procura_shared::types::{RequestId, UserId};

use common::TestContext;

async fn status_of(ctx: &TestContext, id: RequestId) -> RequestStatus {
    ctx.requests
        .find_by_id(id)
        .await
        .expect("query")
        .expect("request exists")
        .status
}

async fn approve_to_approved(ctx: &TestContext, id: RequestId) {
    ctx.workflow
        .decide(id, ctx.users.approver1, Decision::Approve, None)
        .await
        .expect("level 1 approve");
    ctx.workflow
        .decide(id, ctx.users.approver2, Decision::Approve, None)
        .await
        .expect("level 2 approve");
}

/// Installs a trigger that moves the request to `status` as soon as a row
/// lands in `table`, i.e. between the repository's read and its status write.
async fn move_status_on_insert(ctx: &TestContext, table: &str, status: &str) {
    ctx.db
        .execute_unprepared(&format!(
            "CREATE TRIGGER interleave_{table} AFTER INSERT ON {table} \
             BEGIN UPDATE purchase_requests SET status = '{status}' \
             WHERE id = NEW.request_id; END"
        ))
        .await
        .expect("create trigger");
}

async fn drop_trigger(ctx: &TestContext, table: &str) {
    ctx.db
        .execute_unprepared(&format!("DROP TRIGGER interleave_{table}"))
        .await
        .expect("drop trigger");
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_two_level_approval() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;
    assert_eq!(status_of(&ctx, id).await, RequestStatus::PendingL1);

    let first = ctx
        .workflow
        .decide(
            id,
            ctx.users.approver1,
            Decision::Approve,
            Some("Looks good".to_string()),
        )
        .await
        .expect("level 1 approve");
    assert_eq!(first.request.status, RequestStatus::PendingL2);
    assert_eq!(first.approval.level, 1);
    assert_eq!(first.approval.decision, ApprovalDecision::Approved);
    assert_eq!(first.approval.comment, "Looks good");
    assert_eq!(first.approval.approver_id, ctx.users.approver1.into_inner());

    let second = ctx
        .workflow
        .decide(id, ctx.users.approver2, Decision::Approve, None)
        .await
        .expect("level 2 approve");
    assert_eq!(second.request.status, RequestStatus::Approved);
    assert_eq!(second.approval.level, 2);
    assert_eq!(second.approval.comment, "");

    // Reads after return see the new status and both approvals.
    assert_eq!(status_of(&ctx, id).await, RequestStatus::Approved);
    let approvals = ctx.requests.list_approvals(id).await.expect("list");
    assert_eq!(approvals.len(), 2);
    assert_eq!(approvals[0].level, 1);
    assert_eq!(approvals[1].level, 2);
}

#[tokio::test]
async fn test_third_decision_fails() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;
    approve_to_approved(&ctx, id).await;

    for actor in [ctx.users.approver1, ctx.users.approver2] {
        let result = ctx
            .workflow
            .decide(id, actor, Decision::Approve, None)
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidState {
                status: CoreStatus::Approved,
                ..
            })
        ));
    }

    let approvals = ctx.requests.list_approvals(id).await.expect("list");
    assert_eq!(approvals.len(), 2);
}

#[tokio::test]
async fn test_reject_at_level_one() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    let outcome = ctx
        .workflow
        .decide(
            id,
            ctx.users.approver1,
            Decision::Reject,
            Some("Budget constraints".to_string()),
        )
        .await
        .expect("reject");

    assert_eq!(outcome.request.status, RequestStatus::RejectedL1);
    assert_eq!(outcome.request.amount, dec!(2900.00));

    let approvals = ctx.requests.list_approvals(id).await.expect("list");
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].level, 1);
    assert_eq!(approvals[0].decision, ApprovalDecision::Rejected);
    assert_eq!(approvals[0].comment, "Budget constraints");

    // Level 2 can never be decided after a level 1 rejection.
    let result = ctx
        .workflow
        .decide(id, ctx.users.approver2, Decision::Approve, None)
        .await;
    assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    assert!(approvals.iter().all(|a| a.level != 2));
}

#[tokio::test]
async fn test_reject_at_level_two() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    ctx.workflow
        .decide(id, ctx.users.approver1, Decision::Approve, None)
        .await
        .expect("level 1 approve");
    let outcome = ctx
        .workflow
        .decide(id, ctx.users.approver2, Decision::Reject, None)
        .await
        .expect("level 2 reject");

    assert_eq!(outcome.request.status, RequestStatus::RejectedL2);
    assert_eq!(outcome.approval.decision, ApprovalDecision::Rejected);
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn test_wrong_role_is_not_authorized() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    for actor in [
        ctx.users.staff,
        ctx.users.approver2,
        ctx.users.finance,
        ctx.users.admin,
    ] {
        let result = ctx
            .workflow
            .decide(id, actor, Decision::Approve, None)
            .await;
        assert!(
            matches!(result, Err(WorkflowError::NotAuthorized { .. })),
            "expected NotAuthorized, got {result:?}"
        );
    }

    assert_eq!(status_of(&ctx, id).await, RequestStatus::PendingL1);
    assert!(ctx.requests.list_approvals(id).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_approver1_on_pending_l2_is_invalid_state() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    ctx.workflow
        .decide(id, ctx.users.approver1, Decision::Approve, None)
        .await
        .expect("level 1 approve");

    let result = ctx
        .workflow
        .decide(id, ctx.users.approver1, Decision::Reject, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::PendingL2,
            action: Action::Reject,
        })
    ));
    assert_eq!(status_of(&ctx, id).await, RequestStatus::PendingL2);
}

#[tokio::test]
async fn test_terminal_statuses_reject_every_role() {
    let ctx = TestContext::new().await;

    let rejected_l1 = ctx.submit_sample().await;
    ctx.workflow
        .decide(rejected_l1, ctx.users.approver1, Decision::Reject, None)
        .await
        .expect("reject");

    let completed = ctx.submit_sample().await;
    approve_to_approved(&ctx, completed).await;
    ctx.workflow
        .validate_receipt(completed, ctx.users.finance, ReceiptStatus::Received, None)
        .await
        .expect("validate");

    let actors = [
        ctx.users.staff,
        ctx.users.approver1,
        ctx.users.approver2,
        ctx.users.finance,
        ctx.users.admin,
    ];
    for id in [rejected_l1, completed] {
        for actor in actors {
            for decision in [Decision::Approve, Decision::Reject] {
                let result = ctx.workflow.decide(id, actor, decision, None).await;
                assert!(
                    matches!(result, Err(WorkflowError::InvalidState { .. })),
                    "expected InvalidState, got {result:?}"
                );
            }
        }
    }
}

#[tokio::test]
async fn test_decide_not_found() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    let missing_request = RequestId::new();
    let result = ctx
        .workflow
        .decide(missing_request, ctx.users.approver1, Decision::Approve, None)
        .await;
    match result {
        Err(WorkflowError::RequestNotFound(got)) => assert_eq!(got, missing_request.into_inner()),
        other => panic!("Expected RequestNotFound, got {other:?}"),
    }

    let missing_user = UserId::new();
    let result = ctx
        .workflow
        .decide(id, missing_user, Decision::Approve, None)
        .await;
    assert!(matches!(result, Err(WorkflowError::UserNotFound(_))));
}

// ============================================================================
// Uniqueness and concurrency
// ============================================================================

#[tokio::test]
async fn test_existing_approval_at_level_yields_invalid_state() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    // A level 1 row committed by someone else, status not yet moved.
    approvals::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        request_id: Set(id.into_inner()),
        approver_id: Set(ctx.users.approver1.into_inner()),
        level: Set(1),
        decision: Set(ApprovalDecision::Approved),
        comment: Set(String::new()),
        decided_at: Set(chrono::Utc::now().into()),
    }
    .insert(&ctx.db)
    .await
    .expect("seed approval");

    let result = ctx
        .workflow
        .decide(id, ctx.users.approver1, Decision::Reject, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::PendingL1,
            ..
        })
    ));

    // Nothing of the losing attempt persisted.
    assert_eq!(status_of(&ctx, id).await, RequestStatus::PendingL1);
    let approvals = ctx.requests.list_approvals(id).await.expect("list");
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].decision, ApprovalDecision::Approved);
}

#[tokio::test]
async fn test_concurrent_decisions_exactly_one_wins() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    let second_approver1 =
        common::create_user(&ctx.user_repo, "frank", UserRole::Approver1).await;
    let repo = Arc::new(WorkflowRepository::new(ctx.db.clone()));

    let attempts = [
        (ctx.users.approver1, Decision::Approve),
        (second_approver1, Decision::Reject),
        (ctx.users.approver1, Decision::Reject),
        (second_approver1, Decision::Approve),
    ];
    let handles = attempts.into_iter().map(|(actor, decision)| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.decide(id, actor, decision, None).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one decision must win");
    for result in &results {
        if let Err(e) = result {
            assert!(
                matches!(e, WorkflowError::InvalidState { .. }),
                "loser must get InvalidState, got {e:?}"
            );
        }
    }

    let winner = winners[0];
    assert_eq!(status_of(&ctx, id).await, winner.request.status);
    let approvals = ctx.requests.list_approvals(id).await.expect("list");
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].id, winner.approval.id);
}

#[tokio::test]
async fn test_status_moved_during_decision_yields_invalid_state() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    move_status_on_insert(&ctx, "approvals", "rejected_l1").await;
    let result = ctx
        .workflow
        .decide(id, ctx.users.approver1, Decision::Approve, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::PendingL1,
            action: Action::Approve,
        })
    ));

    // The rollback took the approval row and the interleaved write with it.
    assert_eq!(status_of(&ctx, id).await, RequestStatus::PendingL1);
    assert!(ctx.requests.list_approvals(id).await.expect("list").is_empty());

    drop_trigger(&ctx, "approvals").await;
    ctx.workflow
        .decide(id, ctx.users.approver1, Decision::Approve, None)
        .await
        .expect("decision succeeds once nothing interferes");
    assert_eq!(status_of(&ctx, id).await, RequestStatus::PendingL2);
}

// ============================================================================
// Receipt validation
// ============================================================================

#[tokio::test]
async fn test_validate_receipt_completes_request() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;
    approve_to_approved(&ctx, id).await;

    let outcome = ctx
        .workflow
        .validate_receipt(
            id,
            ctx.users.finance,
            ReceiptStatus::PartiallyReceived,
            Some("One chair missing".to_string()),
        )
        .await
        .expect("validate");

    assert_eq!(outcome.request.status, RequestStatus::Completed);
    assert_eq!(
        outcome.validation.receipt_status,
        DbReceiptStatus::PartiallyReceived
    );
    assert_eq!(outcome.validation.comment, "One chair missing");

    let stored = ctx
        .workflow
        .find_receipt_validation(id)
        .await
        .expect("query")
        .expect("validation exists");
    assert_eq!(stored.id, outcome.validation.id);

    // A second validation finds the request completed.
    let result = ctx
        .workflow
        .validate_receipt(id, ctx.users.finance, ReceiptStatus::Received, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::Completed,
            action: Action::ValidateReceipt,
        })
    ));
}

#[tokio::test]
async fn test_validate_receipt_on_non_approved_is_invalid_state() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;

    let result = ctx
        .workflow
        .validate_receipt(id, ctx.users.finance, ReceiptStatus::Received, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::PendingL1,
            ..
        })
    ));

    ctx.workflow
        .decide(id, ctx.users.approver1, Decision::Approve, None)
        .await
        .expect("level 1 approve");
    let result = ctx
        .workflow
        .validate_receipt(id, ctx.users.finance, ReceiptStatus::Received, None)
        .await;
    assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    assert!(
        ctx.workflow
            .find_receipt_validation(id)
            .await
            .expect("query")
            .is_none()
    );
}

#[tokio::test]
async fn test_validate_receipt_requires_finance() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;
    approve_to_approved(&ctx, id).await;

    for actor in [ctx.users.staff, ctx.users.approver2, ctx.users.admin] {
        let result = ctx
            .workflow
            .validate_receipt(id, actor, ReceiptStatus::Received, None)
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::NotAuthorized {
                action: Action::ValidateReceipt,
                ..
            })
        ));
    }
    assert_eq!(status_of(&ctx, id).await, RequestStatus::Approved);
}

#[tokio::test]
async fn test_existing_receipt_validation_yields_invalid_state() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;
    approve_to_approved(&ctx, id).await;

    // A validation committed by someone else, status not yet moved.
    let seeded = receipt_validations::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        request_id: Set(id.into_inner()),
        validated_by: Set(ctx.users.finance.into_inner()),
        receipt_status: Set(DbReceiptStatus::Received),
        comment: Set(String::new()),
        validated_at: Set(chrono::Utc::now().into()),
    }
    .insert(&ctx.db)
    .await
    .expect("seed validation");

    let result = ctx
        .workflow
        .validate_receipt(id, ctx.users.finance, ReceiptStatus::NotReceived, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::Approved,
            action: Action::ValidateReceipt,
        })
    ));

    assert_eq!(status_of(&ctx, id).await, RequestStatus::Approved);
    let stored = ctx
        .workflow
        .find_receipt_validation(id)
        .await
        .expect("query")
        .expect("validation exists");
    assert_eq!(stored.id, seeded.id);
    assert_eq!(stored.receipt_status, DbReceiptStatus::Received);
}

#[tokio::test]
async fn test_status_moved_during_receipt_validation_yields_invalid_state() {
    let ctx = TestContext::new().await;
    let id = ctx.submit_sample().await;
    approve_to_approved(&ctx, id).await;

    move_status_on_insert(&ctx, "receipt_validations", "completed").await;
    let result = ctx
        .workflow
        .validate_receipt(id, ctx.users.finance, ReceiptStatus::Received, None)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::InvalidState {
            status: CoreStatus::Approved,
            action: Action::ValidateReceipt,
        })
    ));

    assert_eq!(status_of(&ctx, id).await, RequestStatus::Approved);
    assert!(
        ctx.workflow
            .find_receipt_validation(id)
            .await
            .expect("query")
            .is_none()
    );
}
