//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! All of them report failures as `procura_core::workflow::WorkflowError`.

mod convert;

pub mod attachment;
pub mod purchase_request;
pub mod user;
pub mod workflow;

pub use attachment::{AttachmentRepository, AttachmentUpload, NewAttachment};
pub use purchase_request::{PurchaseRequestRepository, RequestDetail};
pub use user::{NewUser, UserRepository};
pub use workflow::{DecisionOutcome, ReceiptOutcome, WorkflowRepository};
