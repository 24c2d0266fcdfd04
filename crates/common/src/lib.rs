//! Shared types used across the order-placement crates.

pub mod types;

pub use types::{CustomerId, Money, OrderId, ProductId};
