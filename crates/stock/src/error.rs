//! Stock ledger error types.

use common::ProductId;
use thiserror::Error;

/// Batch-level reservation failures.
///
/// Both variants carry enough product-level detail for the
/// orchestrator to surface them to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// One or more requested products do not exist in the ledger.
    #[error("product(s) not found: {}", format_ids(.missing))]
    ProductNotFound {
        /// The requested ids with no ledger row, in ascending order.
        missing: Vec<ProductId>,
    },

    /// A product cannot satisfy the quantity requested by the batch.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        /// Total quantity the batch requested for this product.
        requested: u32,
        available: u32,
    },
}

fn format_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
