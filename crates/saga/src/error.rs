//! Placement error taxonomy.

use common::{CustomerId, OrderId};
use domain::OrderError;
use serde::{Deserialize, Serialize};
use stock::StockError;
use thiserror::Error;

/// Errors surfaced by the placement saga.
///
/// Callers never see a raw collaborator error: every failure maps to
/// one of the four [`ErrorKind`]s, and partial-success states are
/// never exposed.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Request rejected before any collaborator call.
    #[error("Invalid order request: {0}")]
    Invalid(#[from] OrderError),

    /// The customer does not exist in the directory.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Batch reservation failed; detail passes through unchanged.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The gateway declined the charge.
    #[error("Payment failed for order '{reference}': {reason}")]
    PaymentFailed { reference: String, reason: String },

    /// Read-path miss: no order with the given id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A collaborator failed for non-business reasons.
    #[error("Step '{step}' failed: {reason}")]
    Collaborator { step: &'static str, reason: String },

    /// A collaborator call exceeded its configured deadline.
    #[error("Step '{step}' timed out")]
    Timeout { step: &'static str },
}

impl PlacementError {
    /// Classifies the error into the closed taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlacementError::Invalid(_) => ErrorKind::Validation,
            PlacementError::CustomerNotFound(_)
            | PlacementError::Stock(_)
            | PlacementError::PaymentFailed { .. } => ErrorKind::BusinessRule,
            PlacementError::OrderNotFound(_) => ErrorKind::NotFound,
            PlacementError::Collaborator { .. } | PlacementError::Timeout { .. } => {
                ErrorKind::SystemFault
            }
        }
    }

    /// Returns true if the caller may retry the same request.
    ///
    /// Only system faults are retryable; business rule violations and
    /// validation errors require a changed request.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::SystemFault
    }
}

/// The four failure kinds callers can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed request; fixable by the caller.
    Validation,

    /// Domain constraint violated (unknown customer, short stock,
    /// declined payment).
    BusinessRule,

    /// No such resource on a read path.
    NotFound,

    /// Collaborator unreachable, erroring, or timed out.
    SystemFault,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Validation",
            ErrorKind::BusinessRule => "BusinessRule",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::SystemFault => "SystemFault",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convenience type alias for placement results.
pub type Result<T> = std::result::Result<T, PlacementError>;
