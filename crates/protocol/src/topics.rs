//! Topic names for the choreography.

/// Emitted by the order owner when an order is placed.
pub const ORDER_CREATED: &str = "order-created";

/// Emitted by the order owner when an order is cancelled.
pub const ORDER_CANCELLED: &str = "order-cancelled";

/// Emitted by the payment owner after settlement.
pub const PAYMENT_PROCESSED: &str = "payment-processed";

/// Emitted by the external inventory owner; consumed only.
pub const INVENTORY_UPDATED: &str = "inventory-updated";

/// Consumer group of the order owner.
pub const ORDER_SERVICE_GROUP: &str = "order-service";

/// Consumer group of the payment owner.
pub const PAYMENT_SERVICE_GROUP: &str = "payment-service";
