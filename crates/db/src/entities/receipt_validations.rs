//! `SeaORM` Entity for receipt_validations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReceiptStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_validations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub request_id: Uuid,
    pub validated_by: Uuid,
    pub receipt_status: ReceiptStatus,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub validated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_requests::Entity",
        from = "Column::RequestId",
        to = "super::purchase_requests::Column::Id"
    )]
    PurchaseRequests,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ValidatedBy",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::purchase_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequests.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
