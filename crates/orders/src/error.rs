//! Order owner error types.

use common::{Money, OrderId, ProductId};
use thiserror::Error;

use crate::state::OrderStatus;

/// Errors surfaced at the order command boundary.
///
/// Validation and conflict errors are detected before any state mutation.
/// Cross-owner failures (declined payment, failed reservation) are not
/// errors; they arrive as events and become ordinary status transitions.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order must contain at least one item.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// An item had a quantity below one.
    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// An item had a non-positive unit price.
    #[error("invalid unit price {unit_price} for product {product_id}")]
    InvalidPrice {
        product_id: ProductId,
        unit_price: Money,
    },

    /// No order exists with the given ID.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order's current status does not allow cancellation.
    #[error("cannot cancel order in {status} status")]
    CannotCancel { status: OrderStatus },

    /// A serialization error occurred while building an outbound event.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
