//! Incoming order request and its validation.

use common::{CustomerId, Money};
use serde::{Deserialize, Serialize};

use super::value_objects::{PaymentMethod, PurchaseLine};
use super::OrderError;

/// A customer's request to place an order.
///
/// The `amount` field is advisory only: the authoritative total is
/// recomputed from reserved-line prices, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Caller-supplied idempotency token, opaque to the workflow.
    pub reference: String,

    /// The ordering customer.
    pub customer_id: CustomerId,

    /// How the customer intends to pay.
    pub payment_method: PaymentMethod,

    /// Caller-computed total. Ignored for authority purposes.
    pub amount: Option<Money>,

    /// The requested purchase lines.
    pub lines: Vec<PurchaseLine>,
}

impl OrderRequest {
    /// Creates a request without an advisory amount.
    pub fn new(
        reference: impl Into<String>,
        customer_id: impl Into<CustomerId>,
        payment_method: PaymentMethod,
        lines: Vec<PurchaseLine>,
    ) -> Self {
        Self {
            reference: reference.into(),
            customer_id: customer_id.into(),
            payment_method,
            amount: None,
            lines,
        }
    }

    /// Checks the request shape before any collaborator is contacted.
    ///
    /// Rejects an empty customer id, an empty line list, and any line
    /// with a zero quantity.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.customer_id.is_empty() {
            return Err(OrderError::CustomerIdRequired);
        }
        if self.lines.is_empty() {
            return Err(OrderError::NoLines);
        }
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }
        }
        Ok(())
    }
}
