//! Stock ledger for the order-placement workflow.
//!
//! Owns product quantity state and exposes the one mutation path over
//! it: an all-or-nothing batch reservation. Every line of a batch is
//! validated against availability before any quantity is decremented,
//! so a rejected batch never consumes stock, including lines that
//! would have succeeded on their own.

pub mod error;
pub mod ledger;
pub mod product;

pub use error::StockError;
pub use ledger::{InMemoryStockLedger, StockLedger};
pub use product::Product;
