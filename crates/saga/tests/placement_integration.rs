//! Integration tests for the order-placement saga.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{CustomerId, Money, OrderId, ProductId};
use domain::{OrderLine, OrderRequest, PaymentMethod, PurchaseLine};
use saga::{
    ChargeOutcome, CustomerDirectory, ErrorKind, InMemoryCustomerDirectory,
    InMemoryEventPublisher, InMemoryOrderStore, InMemoryPaymentGateway, OrderPlacement,
    PaymentGateway, PlacementConfig, PlacementError,
};
use stock::{InMemoryStockLedger, Product, StockError, StockLedger};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

type TestPlacement = OrderPlacement<
    InMemoryCustomerDirectory,
    InMemoryStockLedger,
    InMemoryPaymentGateway,
    InMemoryOrderStore,
    InMemoryEventPublisher,
>;

struct TestHarness {
    placement: TestPlacement,
    directory: InMemoryCustomerDirectory,
    ledger: InMemoryStockLedger,
    gateway: InMemoryPaymentGateway,
    store: InMemoryOrderStore,
    publisher: InMemoryEventPublisher,
}

impl TestHarness {
    fn new() -> Self {
        init_tracing();

        let directory = InMemoryCustomerDirectory::new();
        directory.register("CUST123");

        let ledger = InMemoryStockLedger::with_products([Product::new(
            1u64,
            10,
            Money::from_cents(10000),
        )]);

        let gateway = InMemoryPaymentGateway::new();
        let store = InMemoryOrderStore::new();
        let publisher = InMemoryEventPublisher::new();

        let placement = OrderPlacement::new(
            directory.clone(),
            ledger.clone(),
            gateway.clone(),
            store.clone(),
            publisher.clone(),
        );

        Self {
            placement,
            directory,
            ledger,
            gateway,
            store,
            publisher,
        }
    }

    fn request(&self, quantity: u32) -> OrderRequest {
        OrderRequest::new(
            "ref-001",
            "CUST123",
            PaymentMethod::Card,
            vec![PurchaseLine::new(1u64, quantity)],
        )
    }
}

#[tokio::test]
async fn happy_path_end_to_end() {
    let h = TestHarness::new();

    let order_id = h.placement.create_order(h.request(2)).await.unwrap();

    // One reservation, one record, one charge, one publish.
    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(8));
    assert_eq!(h.store.order_count(), 1);
    assert_eq!(h.gateway.charge_count(), 1);
    assert_eq!(h.publisher.published_count(), 1);

    let summary = h.placement.find_by_id(order_id).await.unwrap();
    assert_eq!(summary.customer_id, CustomerId::new("CUST123"));
    assert_eq!(summary.payment_method, PaymentMethod::Card);
    assert_eq!(
        summary.lines,
        vec![OrderLine::new(1u64, 2, Money::from_cents(10000))]
    );
    assert_eq!(summary.lines[0].subtotal().cents(), 20000);
    assert_eq!(summary.total_amount.cents(), 20000);

    let confirmation = &h.publisher.published()[0];
    assert_eq!(confirmation.order_id, order_id);
    assert_eq!(confirmation.reference, "ref-001");
    assert_eq!(confirmation.total_amount.cents(), 20000);
}

#[tokio::test]
async fn oversized_request_leaves_stock_untouched() {
    let h = TestHarness::new();

    let err = h.placement.create_order(h.request(15)).await.unwrap_err();

    assert!(matches!(
        err,
        PlacementError::Stock(StockError::InsufficientStock {
            requested: 15,
            available: 10,
            ..
        })
    ));
    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(10));
    assert_eq!(h.store.order_count(), 0);
    assert_eq!(h.gateway.charge_count(), 0);
    assert_eq!(h.publisher.published_count(), 0);
}

#[tokio::test]
async fn mixed_batch_is_all_or_nothing() {
    let h = TestHarness::new();
    h.ledger
        .insert_product(Product::new(2u64, 5, Money::from_cents(2500)));

    // The product-2 line would succeed alone; the product-1 line is short.
    let mut request = h.request(15);
    request.lines.insert(0, PurchaseLine::new(2u64, 3));

    let err = h.placement.create_order(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(10));
    assert_eq!(h.ledger.available_quantity(ProductId::new(2)), Some(5));
}

#[tokio::test]
async fn unknown_product_fails_the_batch() {
    let h = TestHarness::new();

    let mut request = h.request(2);
    request.lines.push(PurchaseLine::new(42u64, 1));

    let err = h.placement.create_order(request).await.unwrap_err();
    assert!(matches!(
        err,
        PlacementError::Stock(StockError::ProductNotFound { ref missing })
            if missing == &vec![ProductId::new(42)]
    ));
    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(10));
}

/// Ledger wrapper that counts reservation attempts.
#[derive(Clone)]
struct CountingLedger {
    inner: InMemoryStockLedger,
    reserve_calls: Arc<AtomicUsize>,
}

impl CountingLedger {
    fn new(inner: InMemoryStockLedger) -> Self {
        Self {
            inner,
            reserve_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl StockLedger for CountingLedger {
    async fn reserve_all(&self, lines: &[PurchaseLine]) -> Result<Vec<OrderLine>, StockError> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reserve_all(lines).await
    }

    async fn release(&self, lines: &[OrderLine]) -> Result<(), StockError> {
        self.inner.release(lines).await
    }
}

#[tokio::test]
async fn unknown_customer_never_reaches_the_ledger() {
    init_tracing();

    let directory = InMemoryCustomerDirectory::new();
    let ledger = CountingLedger::new(InMemoryStockLedger::with_products([Product::new(
        1u64,
        10,
        Money::from_cents(10000),
    )]));
    let placement = OrderPlacement::new(
        directory,
        ledger.clone(),
        InMemoryPaymentGateway::new(),
        InMemoryOrderStore::new(),
        InMemoryEventPublisher::new(),
    );

    let request = OrderRequest::new(
        "ref-001",
        "CUST123",
        PaymentMethod::Card,
        vec![PurchaseLine::new(1u64, 2)],
    );
    let err = placement.create_order(request).await.unwrap_err();

    assert!(matches!(err, PlacementError::CustomerNotFound(_)));
    assert_eq!(ledger.reserve_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        ledger.inner.available_quantity(ProductId::new(1)),
        Some(10)
    );
}

#[tokio::test]
async fn declined_payment_restores_stock_and_voids_order() {
    let h = TestHarness::new();
    h.gateway.set_decline_charges(true);

    let err = h.placement.create_order(h.request(2)).await.unwrap_err();

    assert!(matches!(err, PlacementError::PaymentFailed { .. }));
    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(10));
    assert_eq!(h.store.order_count(), 0);
    assert_eq!(h.publisher.published_count(), 0);
}

#[tokio::test]
async fn persist_failure_restores_stock() {
    let h = TestHarness::new();
    h.store.set_fail_on_persist(true);

    let err = h.placement.create_order(h.request(2)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SystemFault);
    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(10));
    assert_eq!(h.gateway.charge_count(), 0);
}

#[tokio::test]
async fn publish_failure_keeps_the_committed_order() {
    let h = TestHarness::new();
    h.publisher.set_fail_on_publish(true);

    let order_id = h.placement.create_order(h.request(2)).await.unwrap();

    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(8));
    assert!(h.store.has_order(order_id));
    assert_eq!(h.gateway.charge_count(), 1);
    assert_eq!(h.publisher.published_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_placements_admit_exactly_one_winner() {
    let h = TestHarness::new();
    // Two six-unit orders against ten units: each fits alone, both do not.
    let placement = Arc::new(h.placement);

    let a = {
        let placement = Arc::clone(&placement);
        let request = OrderRequest::new(
            "ref-a",
            "CUST123",
            PaymentMethod::Card,
            vec![PurchaseLine::new(1u64, 6)],
        );
        tokio::spawn(async move { placement.create_order(request).await })
    };
    let b = {
        let placement = Arc::clone(&placement);
        let request = OrderRequest::new(
            "ref-b",
            "CUST123",
            PaymentMethod::Card,
            vec![PurchaseLine::new(1u64, 6)],
        );
        tokio::spawn(async move { placement.create_order(request).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(
        a.is_ok() != b.is_ok(),
        "exactly one placement must win: {a:?} / {b:?}"
    );

    let loser = if a.is_err() { a } else { b };
    assert!(matches!(
        loser,
        Err(PlacementError::Stock(StockError::InsufficientStock {
            requested: 6,
            available: 4,
            ..
        }))
    ));

    assert_eq!(h.ledger.available_quantity(ProductId::new(1)), Some(4));
    assert_eq!(h.store.order_count(), 1);
    assert_eq!(h.gateway.charge_count(), 1);
}

/// Directory that answers after a fixed delay.
struct SlowDirectory {
    delay: Duration,
}

#[async_trait]
impl CustomerDirectory for SlowDirectory {
    async fn exists(&self, _customer_id: &CustomerId) -> Result<bool, PlacementError> {
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}

#[tokio::test]
async fn slow_customer_lookup_times_out() {
    init_tracing();

    let config = PlacementConfig {
        customer_lookup_timeout: Duration::from_millis(10),
        ..PlacementConfig::default()
    };
    let ledger = InMemoryStockLedger::with_products([Product::new(
        1u64,
        10,
        Money::from_cents(10000),
    )]);
    let placement = OrderPlacement::with_config(
        SlowDirectory {
            delay: Duration::from_millis(100),
        },
        ledger.clone(),
        InMemoryPaymentGateway::new(),
        InMemoryOrderStore::new(),
        InMemoryEventPublisher::new(),
        config,
    );

    let request = OrderRequest::new(
        "ref-001",
        "CUST123",
        PaymentMethod::Card,
        vec![PurchaseLine::new(1u64, 2)],
    );
    let err = placement.create_order(request).await.unwrap_err();

    assert!(matches!(
        err,
        PlacementError::Timeout {
            step: "customer_lookup"
        }
    ));
    assert!(err.is_retryable());
    assert_eq!(ledger.available_quantity(ProductId::new(1)), Some(10));
}

/// Gateway that approves after a fixed delay.
struct SlowGateway {
    delay: Duration,
}

#[async_trait]
impl PaymentGateway for SlowGateway {
    async fn charge(
        &self,
        _reference: &str,
        _amount: Money,
        _method: PaymentMethod,
    ) -> Result<ChargeOutcome, PlacementError> {
        tokio::time::sleep(self.delay).await;
        Ok(ChargeOutcome::Approved {
            payment_id: "PAY-SLOW".to_string(),
        })
    }

    async fn refund(&self, _payment_id: &str) -> Result<(), PlacementError> {
        Ok(())
    }
}

#[tokio::test]
async fn slow_charge_times_out_and_unwinds() {
    init_tracing();

    let config = PlacementConfig {
        charge_timeout: Duration::from_millis(10),
        ..PlacementConfig::default()
    };
    let directory = InMemoryCustomerDirectory::new();
    directory.register("CUST123");
    let ledger = InMemoryStockLedger::with_products([Product::new(
        1u64,
        10,
        Money::from_cents(10000),
    )]);
    let store = InMemoryOrderStore::new();
    let placement = OrderPlacement::with_config(
        directory,
        ledger.clone(),
        SlowGateway {
            delay: Duration::from_millis(100),
        },
        store.clone(),
        InMemoryEventPublisher::new(),
        config,
    );

    let request = OrderRequest::new(
        "ref-001",
        "CUST123",
        PaymentMethod::Card,
        vec![PurchaseLine::new(1u64, 2)],
    );
    let err = placement.create_order(request).await.unwrap_err();

    assert!(matches!(
        err,
        PlacementError::Timeout {
            step: "charge_payment"
        }
    ));
    // Reservation released and order voided; nothing survives.
    assert_eq!(ledger.available_quantity(ProductId::new(1)), Some(10));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn read_paths_are_plain_projections() {
    let h = TestHarness::new();

    let first = h.placement.create_order(h.request(2)).await.unwrap();
    let mut second = h.request(1);
    second.reference = "ref-002".to_string();
    second.payment_method = PaymentMethod::BankTransfer;
    let second_id = h.placement.create_order(second).await.unwrap();

    let all = h.placement.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first);
    assert_eq!(all[1].id, second_id);
    assert_eq!(all[1].payment_method, PaymentMethod::BankTransfer);

    // Missing ids are a NotFound condition, never a fault.
    let err = h.placement.find_by_id(OrderId::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
