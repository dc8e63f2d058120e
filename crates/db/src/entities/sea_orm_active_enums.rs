//! String-valued enums stored in text columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase request status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for level 1.
    #[sea_orm(string_value = "pending_l1")]
    PendingL1,
    /// Rejected at level 1.
    #[sea_orm(string_value = "rejected_l1")]
    RejectedL1,
    /// Waiting for level 2.
    #[sea_orm(string_value = "pending_l2")]
    PendingL2,
    /// Rejected at level 2.
    #[sea_orm(string_value = "rejected_l2")]
    RejectedL2,
    /// Fully approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Ordered from the vendor.
    #[sea_orm(string_value = "ordered")]
    Ordered,
    /// Delivered.
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Receipt validated by finance.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// User role column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular staff.
    #[sea_orm(string_value = "staff")]
    #[default]
    Staff,
    /// Level 1 approver.
    #[sea_orm(string_value = "approver1")]
    Approver1,
    /// Level 2 approver.
    #[sea_orm(string_value = "approver2")]
    Approver2,
    /// Finance.
    #[sea_orm(string_value = "finance")]
    Finance,
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Recorded approval decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Receipt validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Everything received.
    #[sea_orm(string_value = "received")]
    Received,
    /// Some items missing.
    #[sea_orm(string_value = "partially_received")]
    PartiallyReceived,
    /// Nothing received.
    #[sea_orm(string_value = "not_received")]
    NotReceived,
}
