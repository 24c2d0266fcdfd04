//! Placement step names, used in logs and error detail.

/// Step name: Resolve the customer in the directory.
pub const STEP_CUSTOMER_LOOKUP: &str = "customer_lookup";

/// Step name: Reserve stock for every purchase line.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: Persist the built order.
pub const STEP_PERSIST_ORDER: &str = "persist_order";

/// Step name: Charge payment for the persisted order.
pub const STEP_CHARGE_PAYMENT: &str = "charge_payment";

/// Step name: Publish the order confirmation event.
pub const STEP_PUBLISH_CONFIRMATION: &str = "publish_confirmation";
