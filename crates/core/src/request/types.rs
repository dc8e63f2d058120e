//! Purchase request input types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input for submitting a new purchase request.
///
/// There is no status field: new requests always start at `pending_l1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseRequest {
    /// Short title.
    pub title: String,
    /// What is being bought and why.
    pub description: String,
    /// Requested amount.
    pub amount: Decimal,
    /// Number of units.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Requesting department.
    #[serde(default)]
    pub department: Option<String>,
    /// Preferred vendor.
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Spend category.
    #[serde(default)]
    pub category: Option<String>,
    /// Urgency label.
    #[serde(default)]
    pub urgency: Option<String>,
    /// Line items created together with the request.
    #[serde(default)]
    pub items: Vec<NewRequestItem>,
}

/// Input for one line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequestItem {
    /// Item name.
    pub item_name: String,
    /// Unit price.
    pub price: Decimal,
    /// Number of units.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

impl NewRequestItem {
    /// `price × quantity`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }
}

fn default_quantity() -> i32 {
    1
}

/// Partial update of an editable request. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New quantity.
    pub quantity: Option<i32>,
    /// New department; `Some(None)` clears it.
    pub department: Option<Option<String>>,
    /// New vendor; `Some(None)` clears it.
    pub vendor_name: Option<Option<String>>,
    /// New category; `Some(None)` clears it.
    pub category: Option<Option<String>>,
    /// New urgency; `Some(None)` clears it.
    pub urgency: Option<Option<String>>,
}

impl RequestUpdate {
    /// Returns true if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.quantity.is_none()
            && self.department.is_none()
            && self.vendor_name.is_none()
            && self.category.is_none()
            && self.urgency.is_none()
    }
}

/// Total of a line item.
#[must_use]
pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}
