//! Business rule validation for purchase request input.

use rust_decimal::Decimal;

use super::types::{NewPurchaseRequest, NewRequestItem, RequestUpdate};
use crate::workflow::WorkflowError;

/// Maximum length of a request title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of an item name.
pub const MAX_ITEM_NAME_LEN: usize = 200;

/// Digits allowed before the decimal point in amounts and prices.
/// Money columns are `DECIMAL(12, 2)`.
pub const MAX_INTEGER_DIGITS: u32 = 10;

/// Validates a new request and all of its items.
///
/// # Errors
///
/// Returns `WorkflowError::Validation` naming the first offending field.
pub fn validate_new_request(input: &NewPurchaseRequest) -> Result<(), WorkflowError> {
    validate_title(&input.title)?;
    validate_description(&input.description)?;
    validate_amount(input.amount)?;
    validate_quantity("quantity", input.quantity)?;

    for (idx, item) in input.items.iter().enumerate() {
        validate_item(item).map_err(|e| match e {
            WorkflowError::Validation(msg) => {
                WorkflowError::Validation(format!("items[{idx}]: {msg}"))
            }
            other => other,
        })?;
    }

    Ok(())
}

/// Validates the fields an update sets.
///
/// # Errors
///
/// Returns `WorkflowError::Validation` naming the first offending field.
pub fn validate_update(update: &RequestUpdate) -> Result<(), WorkflowError> {
    if update.is_empty() {
        return Err(WorkflowError::validation("update changes no fields"));
    }
    if let Some(title) = &update.title {
        validate_title(title)?;
    }
    if let Some(description) = &update.description {
        validate_description(description)?;
    }
    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }
    if let Some(quantity) = update.quantity {
        validate_quantity("quantity", quantity)?;
    }
    Ok(())
}

/// Validates a single line item.
///
/// # Errors
///
/// Returns `WorkflowError::Validation` naming the first offending field.
pub fn validate_item(item: &NewRequestItem) -> Result<(), WorkflowError> {
    let name = item.item_name.trim();
    if name.is_empty() {
        return Err(WorkflowError::validation("item_name is required"));
    }
    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(WorkflowError::validation(format!(
            "item_name exceeds {MAX_ITEM_NAME_LEN} characters"
        )));
    }
    if item.price.is_sign_negative() {
        return Err(WorkflowError::validation("price must not be negative"));
    }
    validate_magnitude("price", item.price)?;
    validate_quantity("item quantity", item.quantity)
}

fn validate_title(title: &str) -> Result<(), WorkflowError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(WorkflowError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(WorkflowError::validation(format!(
            "title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), WorkflowError> {
    if description.trim().is_empty() {
        return Err(WorkflowError::validation("description is required"));
    }
    Ok(())
}

fn validate_amount(amount: Decimal) -> Result<(), WorkflowError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(WorkflowError::validation("amount must not be negative"));
    }
    if amount.scale() > 2 && amount.round_dp(2) != amount {
        return Err(WorkflowError::validation(
            "amount has more than 2 decimal places",
        ));
    }
    validate_magnitude("amount", amount)
}

fn validate_magnitude(field: &str, value: Decimal) -> Result<(), WorkflowError> {
    let ceiling = Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS));
    if value.abs() >= ceiling {
        return Err(WorkflowError::validation(format!(
            "{field} exceeds {MAX_INTEGER_DIGITS} integer digits"
        )));
    }
    Ok(())
}

fn validate_quantity(field: &str, quantity: i32) -> Result<(), WorkflowError> {
    if quantity < 1 {
        return Err(WorkflowError::validation(format!(
            "{field} must be at least 1"
        )));
    }
    Ok(())
}
