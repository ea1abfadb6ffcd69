//! Shared types for the order choreography system.
//!
//! Typed identifiers keep order, payment, and customer IDs from being mixed
//! up across process owners; [`Money`] keeps amounts decimal-exact.

pub mod ids;
pub mod money;

pub use ids::{CustomerId, OrderId, PaymentId, ProductId};
pub use money::Money;
