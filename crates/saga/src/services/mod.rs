//! External collaborator contracts and in-memory implementations.

pub mod customer;
pub mod payment;
pub mod publisher;
pub mod store;

pub use customer::{CustomerDirectory, InMemoryCustomerDirectory};
pub use payment::{ChargeOutcome, InMemoryPaymentGateway, PaymentGateway};
pub use publisher::{EventPublisher, InMemoryEventPublisher};
pub use store::{InMemoryOrderStore, OrderStore};
