//! Order process owner.
//!
//! Owns the Order aggregate and its lifecycle state machine. Orders are
//! created and cancelled by synchronous commands; every other transition is
//! applied by consuming payment and inventory outcome events from the bus.
//! Event-driven transitions go through a conditional status update
//! (compare-and-set) in the store, which makes redelivered events no-ops.

pub mod consumer;
pub mod error;
pub mod order;
pub mod service;
pub mod state;
pub mod store;

pub use consumer::OrderEventConsumer;
pub use error::OrderError;
pub use order::{Order, OrderItem};
pub use service::{CANCEL_REASON, OrderService};
pub use state::OrderStatus;
pub use store::{InMemoryOrderStore, OrderStore, TransitionOutcome};
