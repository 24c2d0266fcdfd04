//! The in-flight order value and the persisted-order projection.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId};
use serde::{Deserialize, Serialize};

use super::value_objects::{OrderLine, PaymentMethod};
use super::OrderError;

/// An order built from reserved lines, not yet persisted.
///
/// The total is always recomputed from the line subtotals at
/// construction; there is no way to set it independently. The value is
/// owned by a single saga invocation and never mutated after persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    reference: String,
    customer_id: CustomerId,
    payment_method: PaymentMethod,
    total_amount: Money,
    lines: Vec<OrderLine>,
}

impl Order {
    /// Builds an order from reserved lines with snapshotted prices.
    ///
    /// Fails if the line list is empty; an order with zero lines is
    /// invalid.
    pub fn from_reserved_lines(
        reference: impl Into<String>,
        customer_id: CustomerId,
        payment_method: PaymentMethod,
        lines: Vec<OrderLine>,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::NoLines);
        }
        let total_amount = lines.iter().map(OrderLine::subtotal).sum();
        Ok(Self {
            reference: reference.into(),
            customer_id,
            payment_method,
            total_amount,
            lines,
        })
    }

    /// Returns the caller-supplied reference token.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the ordering customer.
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Returns the recomputed order total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the reserved lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }
}

/// Read projection of a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Store-assigned identifier.
    pub id: OrderId,

    /// Caller-supplied reference token.
    pub reference: String,

    /// The ordering customer.
    pub customer_id: CustomerId,

    /// How the order was paid.
    pub payment_method: PaymentMethod,

    /// Total at the time of purchase.
    pub total_amount: Money,

    /// The purchased lines with snapshotted prices.
    pub lines: Vec<OrderLine>,

    /// When the order was persisted.
    pub placed_at: DateTime<Utc>,
}
