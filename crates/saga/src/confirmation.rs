//! The order confirmation event published after a successful charge.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId};
use domain::{Order, OrderLine, PaymentMethod};
use serde::{Deserialize, Serialize};

/// Durable confirmation of a placed, paid order.
///
/// Delivered at-least-once by the event publisher; the saga's success
/// does not depend on the delivery ack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Store-assigned order identifier.
    pub order_id: OrderId,

    /// Caller-supplied reference token.
    pub reference: String,

    /// The ordering customer.
    pub customer_id: CustomerId,

    /// How the order was paid.
    pub payment_method: PaymentMethod,

    /// Recomputed order total.
    pub total_amount: Money,

    /// The purchased lines with snapshotted prices.
    pub lines: Vec<OrderLine>,

    /// When the confirmation was produced.
    pub confirmed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Builds the confirmation for a persisted order.
    pub fn new(order_id: OrderId, order: &Order) -> Self {
        Self {
            order_id,
            reference: order.reference().to_string(),
            customer_id: order.customer_id().clone(),
            payment_method: order.payment_method(),
            total_amount: order.total_amount(),
            lines: order.lines().to_vec(),
            confirmed_at: Utc::now(),
        }
    }
}
