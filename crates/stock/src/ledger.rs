//! Batch reservation over product quantities.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;
use domain::{OrderLine, PurchaseLine};

use crate::error::StockError;
use crate::product::Product;

/// Atomic check-and-decrement over a batch of purchase lines.
///
/// Implementations must guarantee that two concurrent `reserve_all`
/// calls touching the same product cannot both observe a quantity that
/// only one of them can actually consume.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Reserves every line of the batch, or nothing.
    ///
    /// Validation covers the whole batch before any quantity moves:
    /// missing products fail the batch with no mutation, and a single
    /// short line fails the batch with no mutation, including lines
    /// that would have succeeded alone. On success, returns one order
    /// line per input line with the unit price snapshotted.
    async fn reserve_all(&self, lines: &[PurchaseLine]) -> Result<Vec<OrderLine>, StockError>;

    /// Returns previously reserved quantities to the ledger.
    ///
    /// Compensating operation; the orchestrator invokes it at most
    /// once per failed saga.
    async fn release(&self, lines: &[OrderLine]) -> Result<(), StockError>;
}

/// Ledger state held behind a single lock.
///
/// The write guard spans the whole validate-then-mutate sequence, so
/// overlapping batches serialize and the check-then-act race cannot
/// lose an update.
#[derive(Debug, Default)]
struct LedgerState {
    products: HashMap<ProductId, Product>,
}

/// In-memory stock ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryStockLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger seeded with the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let ledger = Self::new();
        for product in products {
            ledger.insert_product(product);
        }
        ledger
    }

    /// Inserts or replaces a product row.
    pub fn insert_product(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id, product);
    }

    /// Returns the available quantity for a product, if it exists.
    pub fn available_quantity(&self, product_id: ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .get(&product_id)
            .map(|p| p.available_quantity)
    }

    /// Returns the number of product rows in the ledger.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn reserve_all(&self, lines: &[PurchaseLine]) -> Result<Vec<OrderLine>, StockError> {
        let mut state = self.state.write().unwrap();

        // Cumulative demand per product: two lines naming the same id
        // must not jointly overdraw what each would fit alone.
        let mut demand: BTreeMap<ProductId, u32> = BTreeMap::new();
        for line in lines {
            let entry = demand.entry(line.product_id).or_insert(0);
            *entry = entry.saturating_add(line.quantity);
        }

        let mut missing = Vec::new();
        let mut shortfall = None;
        for (product_id, requested) in &demand {
            match state.products.get(product_id) {
                None => missing.push(*product_id),
                Some(product) => {
                    if product.available_quantity < *requested && shortfall.is_none() {
                        shortfall = Some(StockError::InsufficientStock {
                            product_id: *product_id,
                            requested: *requested,
                            available: product.available_quantity,
                        });
                    }
                }
            }
        }
        if !missing.is_empty() {
            return Err(StockError::ProductNotFound { missing });
        }
        if let Some(err) = shortfall {
            return Err(err);
        }

        // Every line validated; only now do quantities move.
        let mut reserved = Vec::with_capacity(lines.len());
        for line in lines {
            if let Some(product) = state.products.get_mut(&line.product_id) {
                product.available_quantity -= line.quantity;
                reserved.push(OrderLine::new(line.product_id, line.quantity, product.price));
            }
        }
        Ok(reserved)
    }

    async fn release(&self, lines: &[OrderLine]) -> Result<(), StockError> {
        let mut state = self.state.write().unwrap();
        for line in lines {
            if let Some(product) = state.products.get_mut(&line.product_id) {
                product.available_quantity = product.available_quantity.saturating_add(line.quantity);
            }
        }
        Ok(())
    }
}
