//! Payment gateway contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Money;
use domain::PaymentMethod;

use crate::error::PlacementError;
use crate::steps;

/// Outcome of a charge attempt that reached the gateway.
///
/// A decline is a business answer, not a fault; transport-level
/// failures surface as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// The charge was accepted.
    Approved {
        /// Gateway-assigned payment identifier.
        payment_id: String,
    },

    /// The gateway refused the charge.
    Declined { reason: String },
}

/// Executes charges against an external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the given amount for an order reference.
    async fn charge(
        &self,
        reference: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<ChargeOutcome, PlacementError>;

    /// Refunds a previously approved charge.
    ///
    /// Compensating call; unused by the current publish policy but part
    /// of the gateway contract.
    async fn refund(&self, payment_id: &str) -> Result<(), PlacementError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    charges: HashMap<String, (String, Money, PaymentMethod)>,
    next_id: u32,
    decline_charges: bool,
    fail_on_charge: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline charges (business outcome).
    pub fn set_decline_charges(&self, decline: bool) {
        self.state.write().unwrap().decline_charges = decline;
    }

    /// Configures the gateway to fail charges as unreachable (fault).
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Returns the number of standing charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Returns true if a charge exists with the given payment ID.
    pub fn has_charge(&self, payment_id: &str) -> bool {
        self.state.read().unwrap().charges.contains_key(payment_id)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(
        &self,
        reference: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<ChargeOutcome, PlacementError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_charge {
            return Err(PlacementError::Collaborator {
                step: steps::STEP_CHARGE_PAYMENT,
                reason: "payment gateway unreachable".to_string(),
            });
        }

        if state.decline_charges {
            return Ok(ChargeOutcome::Declined {
                reason: "charge declined by issuer".to_string(),
            });
        }

        state.next_id += 1;
        let payment_id = format!("PAY-{:04}", state.next_id);
        state
            .charges
            .insert(payment_id.clone(), (reference.to_string(), amount, method));

        Ok(ChargeOutcome::Approved { payment_id })
    }

    async fn refund(&self, payment_id: &str) -> Result<(), PlacementError> {
        let mut state = self.state.write().unwrap();
        state.charges.remove(payment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn charge_and_refund() {
        let gateway = InMemoryPaymentGateway::new();

        let outcome = gateway
            .charge("ref-001", Money::from_cents(5000), PaymentMethod::Card)
            .await
            .unwrap();
        let ChargeOutcome::Approved { payment_id } = outcome else {
            panic!("expected approval, got {outcome:?}");
        };
        assert!(payment_id.starts_with("PAY-"));
        assert_eq!(gateway.charge_count(), 1);
        assert!(gateway.has_charge(&payment_id));

        gateway.refund(&payment_id).await.unwrap();
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn declined_charge_is_an_outcome_not_an_error() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_decline_charges(true);

        let outcome = gateway
            .charge("ref-001", Money::from_cents(5000), PaymentMethod::Card)
            .await
            .unwrap();
        assert!(matches!(outcome, ChargeOutcome::Declined { .. }));
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_fault() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_charge(true);

        let err = gateway
            .charge("ref-001", Money::from_cents(5000), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, PlacementError::Collaborator { .. }));
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn sequential_payment_ids() {
        let gateway = InMemoryPaymentGateway::new();

        let r1 = gateway
            .charge("ref-001", Money::from_cents(1000), PaymentMethod::Card)
            .await
            .unwrap();
        let r2 = gateway
            .charge("ref-002", Money::from_cents(1000), PaymentMethod::Cod)
            .await
            .unwrap();

        assert_eq!(
            r1,
            ChargeOutcome::Approved {
                payment_id: "PAY-0001".to_string()
            }
        );
        assert_eq!(
            r2,
            ChargeOutcome::Approved {
                payment_id: "PAY-0002".to_string()
            }
        );
    }
}
