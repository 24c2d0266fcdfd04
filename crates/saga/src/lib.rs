//! Order-placement saga.
//!
//! This crate orchestrates order creation across independent
//! collaborators with compensating actions on failure:
//! 1. Look up the customer
//! 2. Reserve stock for every line (all-or-nothing)
//! 3. Persist the order
//! 4. Charge payment
//! 5. Publish the confirmation event
//!
//! A failure in steps 2-4 unwinds previously completed steps in
//! reverse order. Publish failure is never unwound: the charge is
//! authoritative, and the confirmation is retried by the publishing
//! collaborator.

pub mod config;
pub mod confirmation;
pub mod coordinator;
pub mod error;
pub mod services;
pub mod steps;

pub use config::PlacementConfig;
pub use confirmation::OrderConfirmation;
pub use coordinator::OrderPlacement;
pub use error::{ErrorKind, PlacementError, Result};
pub use services::{
    ChargeOutcome, CustomerDirectory, EventPublisher, InMemoryCustomerDirectory,
    InMemoryEventPublisher, InMemoryOrderStore, InMemoryPaymentGateway, OrderStore,
    PaymentGateway,
};
