//! Event bus abstraction for the order choreography system.
//!
//! This crate provides the messaging primitives the process owners build on:
//! - [`Envelope`] — a topic-addressed, partition-keyed event wrapper
//! - [`EventBus`] / [`EventHandler`] — at-least-once publish/subscribe with
//!   competing consumer groups
//! - [`InMemoryEventBus`] — an in-process implementation with the same
//!   delivery semantics as a partitioned broker
//! - [`Outbox`] / [`OutboxRelay`] — the transactional outbox building blocks
//!   that close the dual-write hazard between an aggregate store and the bus
//!
//! No business logic lives here.

pub mod bus;
pub mod envelope;
pub mod error;
pub mod memory;
pub mod outbox;

pub use bus::{DeliveryReceipt, EventBus, EventHandler};
pub use envelope::{Envelope, EnvelopeBuilder, EventId};
pub use error::{BusError, Result};
pub use memory::InMemoryEventBus;
pub use outbox::{Outbox, OutboxRecord, OutboxRelay, OutboxStatus};
