//! Order store contract and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{Order, OrderSummary};

use crate::error::PlacementError;
use crate::steps;

/// Durable record of orders and their lines.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order and returns the assigned identifier.
    async fn persist(&self, order: Order) -> Result<OrderId, PlacementError>;

    /// Voids a previously persisted order.
    ///
    /// Compensating call; invoked by the orchestrator when a later
    /// saga step fails.
    async fn void(&self, order_id: OrderId) -> Result<(), PlacementError>;

    /// Returns all persisted orders in placement order.
    async fn find_all(&self) -> Result<Vec<OrderSummary>, PlacementError>;

    /// Returns the order with the given id, if any.
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<OrderSummary>, PlacementError>;
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    orders: Vec<OrderSummary>,
    fail_on_persist: bool,
}

/// In-memory order store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

impl InMemoryOrderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail persists as unreachable.
    pub fn set_fail_on_persist(&self, fail: bool) {
        self.state.write().unwrap().fail_on_persist = fail;
    }

    /// Returns the number of standing (non-voided) orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns true if an order exists with the given id.
    pub fn has_order(&self, order_id: OrderId) -> bool {
        self.state
            .read()
            .unwrap()
            .orders
            .iter()
            .any(|o| o.id == order_id)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn persist(&self, order: Order) -> Result<OrderId, PlacementError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_persist {
            return Err(PlacementError::Collaborator {
                step: steps::STEP_PERSIST_ORDER,
                reason: "order store unreachable".to_string(),
            });
        }

        let order_id = OrderId::new();
        state.orders.push(OrderSummary {
            id: order_id,
            reference: order.reference().to_string(),
            customer_id: order.customer_id().clone(),
            payment_method: order.payment_method(),
            total_amount: order.total_amount(),
            lines: order.lines().to_vec(),
            placed_at: Utc::now(),
        });

        Ok(order_id)
    }

    async fn void(&self, order_id: OrderId) -> Result<(), PlacementError> {
        let mut state = self.state.write().unwrap();
        state.orders.retain(|o| o.id != order_id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<OrderSummary>, PlacementError> {
        Ok(self.state.read().unwrap().orders.clone())
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<OrderSummary>, PlacementError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CustomerId, Money};
    use domain::{OrderLine, PaymentMethod};

    fn order(reference: &str) -> Order {
        Order::from_reserved_lines(
            reference,
            CustomerId::new("CUST123"),
            PaymentMethod::Card,
            vec![OrderLine::new(1u64, 2, Money::from_cents(10000))],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn persist_assigns_id_and_find_by_id_returns_it() {
        let store = InMemoryOrderStore::new();

        let order_id = store.persist(order("ref-001")).await.unwrap();

        let summary = store.find_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(summary.id, order_id);
        assert_eq!(summary.reference, "ref-001");
        assert_eq!(summary.total_amount.cents(), 20000);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn find_by_id_on_missing_order_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.find_by_id(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn void_removes_the_order() {
        let store = InMemoryOrderStore::new();
        let order_id = store.persist(order("ref-001")).await.unwrap();

        store.void(order_id).await.unwrap();

        assert_eq!(store.order_count(), 0);
        assert!(!store.has_order(order_id));
    }

    #[tokio::test]
    async fn find_all_preserves_placement_order() {
        let store = InMemoryOrderStore::new();
        store.persist(order("ref-001")).await.unwrap();
        store.persist(order("ref-002")).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].reference, "ref-001");
        assert_eq!(all[1].reference, "ref-002");
    }

    #[tokio::test]
    async fn fail_on_persist_surfaces_collaborator_error() {
        let store = InMemoryOrderStore::new();
        store.set_fail_on_persist(true);

        let err = store.persist(order("ref-001")).await.unwrap_err();
        assert!(matches!(err, PlacementError::Collaborator { .. }));
        assert_eq!(store.order_count(), 0);
    }
}
