//! Customer directory contract and in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CustomerId;

use crate::error::PlacementError;
use crate::steps;

/// Read-only lookup of customer existence.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns true if the customer is known to the directory.
    async fn exists(&self, customer_id: &CustomerId) -> Result<bool, PlacementError>;
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    customers: HashSet<CustomerId>,
    fail_on_lookup: bool,
}

/// In-memory customer directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

impl InMemoryCustomerDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a customer as existing.
    pub fn register(&self, customer_id: impl Into<CustomerId>) {
        self.state
            .write()
            .unwrap()
            .customers
            .insert(customer_id.into());
    }

    /// Configures the directory to fail lookups as unreachable.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }

    /// Returns the number of registered customers.
    pub fn customer_count(&self) -> usize {
        self.state.read().unwrap().customers.len()
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn exists(&self, customer_id: &CustomerId) -> Result<bool, PlacementError> {
        let state = self.state.read().unwrap();

        if state.fail_on_lookup {
            return Err(PlacementError::Collaborator {
                step: steps::STEP_CUSTOMER_LOOKUP,
                reason: "customer directory unreachable".to_string(),
            });
        }

        Ok(state.customers.contains(customer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_customer_exists() {
        let directory = InMemoryCustomerDirectory::new();
        directory.register("CUST123");

        assert!(directory
            .exists(&CustomerId::new("CUST123"))
            .await
            .unwrap());
        assert!(!directory
            .exists(&CustomerId::new("CUST999"))
            .await
            .unwrap());
        assert_eq!(directory.customer_count(), 1);
    }

    #[tokio::test]
    async fn fail_on_lookup_surfaces_collaborator_error() {
        let directory = InMemoryCustomerDirectory::new();
        directory.register("CUST123");
        directory.set_fail_on_lookup(true);

        let err = directory
            .exists(&CustomerId::new("CUST123"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacementError::Collaborator { .. }));
    }
}
