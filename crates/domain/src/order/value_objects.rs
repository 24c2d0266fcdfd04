//! Value objects for the order domain.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use super::OrderError;

/// How the customer pays for an order.
///
/// Closed set: call sites must handle every variant exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
    Cod,
}

impl PaymentMethod {
    /// Returns the wire-format name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Paypal => "PAYPAL",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cod => "COD",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(PaymentMethod::Card),
            "PAYPAL" => Ok(PaymentMethod::Paypal),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "COD" => Ok(PaymentMethod::Cod),
            other => Err(OrderError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// A requested line in a reservation batch: which product, how many.
///
/// Immutable input; quantities are validated before the batch is sent
/// to the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    /// The product to purchase.
    pub product_id: ProductId,

    /// Requested quantity (must be positive).
    pub quantity: u32,
}

impl PurchaseLine {
    /// Creates a new purchase line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A reserved line of an order.
///
/// The unit price is snapshotted at reservation time so later catalog
/// price changes cannot drift a committed order's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The reserved product.
    pub product_id: ProductId,

    /// Reserved quantity.
    pub quantity: u32,

    /// Price per unit at the time of reservation.
    pub unit_price: Money,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the line subtotal (quantity * unit price).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
