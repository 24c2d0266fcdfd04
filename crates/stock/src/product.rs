//! Product rows owned by the stock ledger.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product as the ledger sees it: identity, available quantity, and
/// the current unit price.
///
/// Rows are created and retired by the catalog subsystem; the ledger
/// only ever moves `available_quantity` through reservation and
/// release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog-assigned identifier.
    pub id: ProductId,

    /// Units currently available for reservation.
    pub available_quantity: u32,

    /// Current unit price, snapshotted onto order lines at reservation.
    pub price: Money,
}

impl Product {
    /// Creates a new product row.
    pub fn new(id: impl Into<ProductId>, available_quantity: u32, price: Money) -> Self {
        Self {
            id: id.into(),
            available_quantity,
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serialization_roundtrip() {
        let product = Product::new(1u64, 10, Money::from_cents(10000));
        let json = serde_json::to_string(&product).unwrap();
        let deserialized: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product, deserialized);
    }
}
