//! Event publisher contract and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::confirmation::OrderConfirmation;
use crate::error::PlacementError;
use crate::steps;

/// At-least-once delivery of order confirmations.
///
/// The saga does not block success on the ack; a failed publish is
/// retried by the publishing collaborator's own policy.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an order confirmation.
    async fn publish(&self, confirmation: OrderConfirmation) -> Result<(), PlacementError>;
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    published: Vec<OrderConfirmation>,
    fail_on_publish: bool,
}

/// In-memory event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to fail as unreachable.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns the number of published confirmations.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }

    /// Returns a copy of every published confirmation.
    pub fn published(&self) -> Vec<OrderConfirmation> {
        self.state.read().unwrap().published.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, confirmation: OrderConfirmation) -> Result<(), PlacementError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(PlacementError::Collaborator {
                step: steps::STEP_PUBLISH_CONFIRMATION,
                reason: "event broker unreachable".to_string(),
            });
        }

        state.published.push(confirmation);
        Ok(())
    }
}
