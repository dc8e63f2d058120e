//! Property-based tests for LifecycleEngine and AuthorizationPolicy.
//!
//! The engine and the policy are two views of the same transition table;
//! these properties check that they never disagree.

use proptest::prelude::*;
use uuid::Uuid;

use procura_shared::types::{RequestId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::policy::{Action, Actor, AuthorizationPolicy, RequestSnapshot, UserRole};
use crate::workflow::service::LifecycleEngine;
use crate::workflow::types::{Decision, ReceiptStatus, RequestStatus, WorkflowAction};

/// Strategy for generating random RequestStatus values.
fn arb_status() -> impl Strategy<Value = RequestStatus> {
    proptest::sample::select(RequestStatus::ALL.to_vec())
}

/// Strategy for generating random UserRole values.
fn arb_role() -> impl Strategy<Value = UserRole> {
    proptest::sample::select(UserRole::ALL.to_vec())
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]
}

fn arb_receipt_status() -> impl Strategy<Value = ReceiptStatus> {
    prop_oneof![
        Just(ReceiptStatus::Received),
        Just(ReceiptStatus::PartiallyReceived),
        Just(ReceiptStatus::NotReceived),
    ]
}

/// Strategy for generating random user ids.
fn arb_user_id() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

fn arb_comment() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-zA-Z0-9 ]{0,60}".prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A successful decision is always an edge of the transition table.
    #[test]
    fn prop_decide_success_is_valid_transition(
        status in arb_status(),
        role in arb_role(),
        user in arb_user_id(),
        decision in arb_decision(),
        comment in arb_comment(),
    ) {
        let actor = Actor::new(user, role);
        if let Ok(action) = LifecycleEngine::decide(status, &actor, decision, comment.clone()) {
            prop_assert!(LifecycleEngine::is_valid_transition(status, action.new_status()));
            if let WorkflowAction::Decide { decided_by, comment: recorded, from_status, .. } = action {
                prop_assert_eq!(decided_by, user);
                prop_assert_eq!(from_status, status);
                prop_assert_eq!(recorded, comment.unwrap_or_default());
            } else {
                prop_assert!(false, "Expected Decide action");
            }
        }
    }

    /// The engine accepts a decision exactly when the policy allows it.
    #[test]
    fn prop_decide_agrees_with_policy(
        status in arb_status(),
        role in arb_role(),
        decision in arb_decision(),
    ) {
        let actor = Actor::new(UserId::new(), role);
        let request = RequestSnapshot {
            id: RequestId::new(),
            created_by: UserId::new(),
            status,
        };

        let engine_ok = LifecycleEngine::decide(status, &actor, decision, None).is_ok();
        let policy_ok = AuthorizationPolicy::can_act(&actor, &request, decision.action());
        prop_assert_eq!(engine_ok, policy_ok);
    }

    /// Outside the two pending statuses, every decision is InvalidState.
    #[test]
    fn prop_decide_outside_pending_is_invalid_state(
        status in arb_status(),
        role in arb_role(),
        decision in arb_decision(),
    ) {
        prop_assume!(status.pending_level().is_none());
        let actor = Actor::new(UserId::new(), role);
        let result = LifecycleEngine::decide(status, &actor, decision, None);
        let is_invalid_state = matches!(result, Err(WorkflowError::InvalidState { .. }));
        prop_assert!(is_invalid_state);
    }

    /// Receipt validation succeeds only for finance on approved requests.
    #[test]
    fn prop_validate_receipt_guard(
        status in arb_status(),
        role in arb_role(),
        receipt in arb_receipt_status(),
    ) {
        let actor = Actor::new(UserId::new(), role);
        let result = LifecycleEngine::validate_receipt(status, &actor, receipt, None);
        let expected = status == RequestStatus::Approved && role == UserRole::Finance;
        prop_assert_eq!(result.is_ok(), expected);
        if let Ok(action) = result {
            prop_assert_eq!(action.new_status(), RequestStatus::Completed);
        }
    }

    /// Edit permission always implies the engine considers the request editable.
    #[test]
    fn prop_edit_implies_can_edit(
        status in arb_status(),
        role in arb_role(),
        owner in any::<bool>(),
    ) {
        let actor = Actor::new(UserId::new(), role);
        let created_by = if owner { actor.id } else { UserId::new() };
        let request = RequestSnapshot { id: RequestId::new(), created_by, status };

        if AuthorizationPolicy::can_act(&actor, &request, Action::Edit) {
            prop_assert!(LifecycleEngine::can_edit(status));
        }
    }

    /// Approver visibility is a single status and never anything else.
    #[test]
    fn prop_approver2_sees_only_pending_l2(status in arb_status()) {
        let actor = Actor::new(UserId::new(), UserRole::Approver2);
        let request = RequestSnapshot {
            id: RequestId::new(),
            created_by: UserId::new(),
            status,
        };
        prop_assert_eq!(
            AuthorizationPolicy::can_act(&actor, &request, Action::View),
            status == RequestStatus::PendingL2
        );
    }
}
