//! Order domain types.

mod order;
mod request;
mod value_objects;

pub use order::{Order, OrderSummary};
pub use request::OrderRequest;
pub use value_objects::{OrderLine, PaymentMethod, PurchaseLine};

use common::ProductId;
use thiserror::Error;

/// Errors raised by order request validation and order construction.
///
/// All of these are caller-fixable: the request is rejected before any
/// collaborator is contacted.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Customer ID is required.
    #[error("Customer ID is required")]
    CustomerIdRequired,

    /// Order has no purchase lines.
    #[error("Order has no purchase lines")]
    NoLines,

    /// A purchase line requested a non-positive quantity.
    #[error("Invalid quantity {quantity} for product {product_id} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// Payment method token is not one of the supported set.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}
