//! Payment owner error types.

use common::{OrderId, PaymentId};
use thiserror::Error;

/// Errors surfaced at the payment command boundary.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A payment already exists for this order.
    ///
    /// One payment per order is the idempotency guard: a second settlement
    /// attempt must never create another record.
    #[error("payment already exists for order: {0}")]
    AlreadyExists(OrderId),

    /// No payment exists with the given ID.
    #[error("payment not found: {0}")]
    NotFound(PaymentId),

    /// No payment exists for the given order.
    #[error("no payment found for order: {0}")]
    NotFoundForOrder(OrderId),

    /// A serialization error occurred while building an outbound event.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
