//! Order domain for the placement workflow.
//!
//! This crate provides the order-side domain model:
//! - Value objects (`PaymentMethod`, `PurchaseLine`, `OrderLine`)
//! - `OrderRequest` with up-front validation
//! - The in-flight `Order` value and the `OrderSummary` read projection

pub mod order;

pub use order::{
    Order, OrderError, OrderLine, OrderRequest, OrderSummary, PaymentMethod, PurchaseLine,
};
