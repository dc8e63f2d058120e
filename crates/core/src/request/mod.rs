//! Purchase request input types and validation.
//!
//! Inputs arrive from the surrounding API layer; everything here is checked
//! before the persistence layer writes a row.

mod types;
mod validation;

pub use types::{NewPurchaseRequest, NewRequestItem, RequestUpdate, line_total};
pub use validation::{
    MAX_INTEGER_DIGITS, MAX_ITEM_NAME_LEN, MAX_TITLE_LEN, validate_item, validate_new_request,
    validate_update,
};
