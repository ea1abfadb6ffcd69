//! Choreography protocol shared by the order and payment process owners.
//!
//! This crate is the complete cross-owner contract: the event schemas, the
//! topics they travel on, and the keying discipline. Every event is keyed by
//! its order ID, so the bus guarantees ordering among all events of one
//! order and consumers can use the order ID as the idempotency key.
//!
//! Owners never share storage or call each other; this contract is the only
//! coupling between them.

pub mod events;
pub mod topics;

pub use events::{
    InventoryUpdated, OrderCancelled, OrderCreated, OrderItemData, PaymentProcessed, WireEvent,
};
