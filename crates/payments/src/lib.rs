//! Payment process owner.
//!
//! Owns the Payment aggregate. Settlement is triggered either by consuming
//! OrderCreated events from the bus or by a direct command; either way the
//! existence of a payment for the order ID is the idempotency guard: one
//! payment per order, ever. Settlement itself is a deterministic function of
//! the amount, standing in for a real gateway so outcomes are reproducible.

pub mod consumer;
pub mod error;
pub mod payment;
pub mod service;
pub mod settlement;
pub mod store;

pub use consumer::PaymentEventConsumer;
pub use error::PaymentError;
pub use payment::{Payment, PaymentStatus};
pub use service::{PaymentService, ProcessPaymentRequest};
pub use settlement::{SettlementOutcome, settle};
pub use store::{InMemoryPaymentStore, PaymentStore};
