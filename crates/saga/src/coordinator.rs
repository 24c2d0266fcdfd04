//! Saga coordinator for order placement.

use std::future::Future;
use std::time::Duration;

use common::OrderId;
use domain::{Order, OrderLine, OrderRequest, OrderSummary};
use stock::StockLedger;

use crate::config::PlacementConfig;
use crate::confirmation::OrderConfirmation;
use crate::error::{PlacementError, Result};
use crate::services::{ChargeOutcome, CustomerDirectory, EventPublisher, OrderStore, PaymentGateway};
use crate::steps;

/// Compensating actions accumulated as steps succeed, unwound in
/// reverse on failure.
#[derive(Debug)]
enum Compensation {
    ReleaseStock(Vec<OrderLine>),
    VoidOrder(OrderId),
}

/// Orchestrates the placement of one order across the five
/// collaborators.
///
/// The coordinator is the only component that triggers compensations;
/// collaborators never self-compensate. Each `create_order` call is
/// one logical unit of work and owns its in-flight order exclusively,
/// so any number of placements can run concurrently.
pub struct OrderPlacement<D, L, G, S, P>
where
    D: CustomerDirectory,
    L: StockLedger,
    G: PaymentGateway,
    S: OrderStore,
    P: EventPublisher,
{
    directory: D,
    ledger: L,
    gateway: G,
    store: S,
    publisher: P,
    config: PlacementConfig,
}

impl<D, L, G, S, P> OrderPlacement<D, L, G, S, P>
where
    D: CustomerDirectory,
    L: StockLedger,
    G: PaymentGateway,
    S: OrderStore,
    P: EventPublisher,
{
    /// Creates a coordinator with default step timeouts.
    pub fn new(directory: D, ledger: L, gateway: G, store: S, publisher: P) -> Self {
        Self::with_config(directory, ledger, gateway, store, publisher, PlacementConfig::default())
    }

    /// Creates a coordinator with the given step timeouts.
    pub fn with_config(
        directory: D,
        ledger: L,
        gateway: G,
        store: S,
        publisher: P,
        config: PlacementConfig,
    ) -> Self {
        Self {
            directory,
            ledger,
            gateway,
            store,
            publisher,
            config,
        }
    }

    /// Places an order: validate, resolve customer, reserve stock,
    /// persist, charge, publish.
    ///
    /// On full success the side effects are exactly one stock
    /// reservation, one order record, one charge, and one publish
    /// attempt, in that order. On failure, no partially-reserved stock
    /// and no order record survive.
    #[tracing::instrument(
        skip(self, request),
        fields(reference = %request.reference, customer_id = %request.customer_id)
    )]
    pub async fn create_order(&self, request: OrderRequest) -> Result<OrderId> {
        metrics::counter!("order_placements_total").increment(1);
        let placement_start = std::time::Instant::now();

        let result = self.run_placement(request).await;

        metrics::histogram!("order_placement_duration_seconds")
            .record(placement_start.elapsed().as_secs_f64());
        match &result {
            Ok(order_id) => {
                metrics::counter!("order_placements_completed").increment(1);
                tracing::info!(%order_id, "order placed");
            }
            Err(err) => {
                metrics::counter!("order_placements_failed").increment(1);
                tracing::warn!(error = %err, kind = %err.kind(), "order placement failed");
            }
        }
        result
    }

    async fn run_placement(&self, request: OrderRequest) -> Result<OrderId> {
        request.validate()?;

        // 1. The customer must exist before anything else is touched.
        tracing::debug!(step = steps::STEP_CUSTOMER_LOOKUP, "placement step started");
        let known = bounded(
            steps::STEP_CUSTOMER_LOOKUP,
            self.config.customer_lookup_timeout,
            self.directory.exists(&request.customer_id),
        )
        .await?;
        if !known {
            return Err(PlacementError::CustomerNotFound(request.customer_id));
        }

        let mut compensations: Vec<Compensation> = Vec::new();

        // 2. Reserve the whole batch. Failure leaves nothing to undo.
        tracing::debug!(step = steps::STEP_RESERVE_STOCK, "placement step started");
        let reserved = bounded(
            steps::STEP_RESERVE_STOCK,
            self.config.reservation_timeout,
            self.ledger.reserve_all(&request.lines),
        )
        .await?;
        compensations.push(Compensation::ReleaseStock(reserved.clone()));

        // 3. Build the order from reserved lines; the total comes from
        // snapshotted prices, never from the request's advisory amount.
        let order = Order::from_reserved_lines(
            request.reference.clone(),
            request.customer_id.clone(),
            request.payment_method,
            reserved,
        )?;
        let total_amount = order.total_amount();

        tracing::debug!(step = steps::STEP_PERSIST_ORDER, "placement step started");
        let order_id = match bounded(
            steps::STEP_PERSIST_ORDER,
            self.config.persist_timeout,
            self.store.persist(order.clone()),
        )
        .await
        {
            Ok(order_id) => order_id,
            Err(err) => {
                self.unwind(compensations, steps::STEP_PERSIST_ORDER).await;
                return Err(err);
            }
        };
        compensations.push(Compensation::VoidOrder(order_id));

        // 4. Charge. A decline and a gateway fault unwind the same way;
        // they differ only in the error surfaced.
        tracing::debug!(step = steps::STEP_CHARGE_PAYMENT, "placement step started");
        let charge = bounded(
            steps::STEP_CHARGE_PAYMENT,
            self.config.charge_timeout,
            self.gateway
                .charge(&request.reference, total_amount, request.payment_method),
        )
        .await;
        let payment_id = match charge {
            Ok(ChargeOutcome::Approved { payment_id }) => payment_id,
            Ok(ChargeOutcome::Declined { reason }) => {
                self.unwind(compensations, steps::STEP_CHARGE_PAYMENT).await;
                return Err(PlacementError::PaymentFailed {
                    reference: request.reference,
                    reason,
                });
            }
            Err(err) => {
                self.unwind(compensations, steps::STEP_CHARGE_PAYMENT).await;
                return Err(err);
            }
        };
        tracing::debug!(%order_id, payment_id = %payment_id, "charge approved");

        // 5. Publish. The order is committed and paid past this point;
        // a publish failure never unwinds steps 1-4.
        tracing::debug!(
            step = steps::STEP_PUBLISH_CONFIRMATION,
            "placement step started"
        );
        let confirmation = OrderConfirmation::new(order_id, &order);
        if let Err(err) = bounded(
            steps::STEP_PUBLISH_CONFIRMATION,
            self.config.publish_timeout,
            self.publisher.publish(confirmation),
        )
        .await
        {
            metrics::counter!("order_confirmation_publish_failures").increment(1);
            tracing::warn!(%order_id, error = %err, "confirmation publish failed; order stands");
        }

        Ok(order_id)
    }

    /// Runs accumulated compensations in reverse order.
    ///
    /// A failing compensation is logged and the chain continues.
    #[tracing::instrument(skip(self, compensations))]
    async fn unwind(&self, compensations: Vec<Compensation>, failed_step: &'static str) {
        tracing::warn!(
            failed_step,
            count = compensations.len(),
            "unwinding placement"
        );
        for compensation in compensations.into_iter().rev() {
            match compensation {
                Compensation::VoidOrder(order_id) => {
                    if let Err(err) = self.store.void(order_id).await {
                        tracing::error!(%order_id, error = %err, "order void failed during unwind");
                    }
                }
                Compensation::ReleaseStock(lines) => {
                    if let Err(err) = self.ledger.release(&lines).await {
                        tracing::error!(error = %err, "stock release failed during unwind");
                    }
                }
            }
        }
    }

    /// Returns all persisted orders.
    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<OrderSummary>> {
        self.store.find_all().await
    }

    /// Returns the order with the given id, or `OrderNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, order_id: OrderId) -> Result<OrderSummary> {
        self.store
            .find_by_id(order_id)
            .await?
            .ok_or(PlacementError::OrderNotFound(order_id))
    }
}

/// Bounds a collaborator call by the step's deadline; a timeout is the
/// step's failure.
async fn bounded<T, E, F>(step: &'static str, limit: Duration, call: F) -> Result<T>
where
    E: Into<PlacementError>,
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(PlacementError::Timeout { step }),
    }
}
