//! `SeaORM` entity definitions.

pub mod approvals;
pub mod attachments;
pub mod purchase_requests;
pub mod receipt_validations;
pub mod request_items;
pub mod sea_orm_active_enums;
pub mod users;

pub mod prelude {
    //! Entity type aliases.

    pub use super::approvals::Entity as Approvals;
    pub use super::attachments::Entity as Attachments;
    pub use super::purchase_requests::Entity as PurchaseRequests;
    pub use super::receipt_validations::Entity as ReceiptValidations;
    pub use super::request_items::Entity as RequestItems;
    pub use super::users::Entity as Users;
}
