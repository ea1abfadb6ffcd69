//! Event schemas exchanged between process owners.

use bus::Envelope;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, PaymentId, ProductId};
use serde::{Deserialize, Serialize};

use crate::topics;

/// An event that travels over the bus between process owners.
///
/// Binds a schema to its topic, its wire name, and its partition key. The
/// key is the order ID for every event in this protocol.
pub trait WireEvent: Serialize + Sized {
    /// Topic the event is published to.
    const TOPIC: &'static str;

    /// Wire name of the event (e.g., "OrderCreated").
    const EVENT_TYPE: &'static str;

    /// Partition key: the correlated order ID.
    fn key(&self) -> String;

    /// Wraps the event in a bus envelope.
    fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        Ok(Envelope::builder()
            .topic(Self::TOPIC)
            .event_type(Self::EVENT_TYPE)
            .key(self.key())
            .payload(self)?
            .build())
    }
}

/// One line of an order as carried inside [`OrderCreated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemData {
    /// The product ordered.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

/// A new order was placed and committed as PENDING.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    /// The order that was created.
    pub order_id: OrderId,

    /// The customer who placed it.
    pub customer_id: CustomerId,

    /// Total amount to settle.
    pub total_amount: Money,

    /// The ordered items.
    pub items: Vec<OrderItemData>,

    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

impl WireEvent for OrderCreated {
    const TOPIC: &'static str = topics::ORDER_CREATED;
    const EVENT_TYPE: &'static str = "OrderCreated";

    fn key(&self) -> String {
        self.order_id.to_string()
    }
}

/// An order was cancelled by command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// The cancelled order.
    pub order_id: OrderId,

    /// Why it was cancelled.
    pub reason: String,
}

impl WireEvent for OrderCancelled {
    const TOPIC: &'static str = topics::ORDER_CANCELLED;
    const EVENT_TYPE: &'static str = "OrderCancelled";

    fn key(&self) -> String {
        self.order_id.to_string()
    }
}

/// The payment owner settled (or declined) the payment for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProcessed {
    /// The correlated order.
    pub order_id: OrderId,

    /// The payment record that was written.
    pub payment_id: PaymentId,

    /// Whether settlement succeeded.
    pub success: bool,

    /// Human-readable outcome description.
    pub message: String,

    /// When settlement finished.
    pub processed_at: DateTime<Utc>,
}

impl WireEvent for PaymentProcessed {
    const TOPIC: &'static str = topics::PAYMENT_PROCESSED;
    const EVENT_TYPE: &'static str = "PaymentProcessed";

    fn key(&self) -> String {
        self.order_id.to_string()
    }
}

/// The external inventory owner reserved (or failed to reserve) stock.
///
/// Consumed only; this system never produces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryUpdated {
    /// The correlated order.
    pub order_id: OrderId,

    /// Whether the reservation succeeded.
    pub success: bool,

    /// Human-readable outcome description.
    pub message: String,

    /// When the inventory change happened.
    pub updated_at: DateTime<Utc>,
}

impl WireEvent for InventoryUpdated {
    const TOPIC: &'static str = topics::INVENTORY_UPDATED;
    const EVENT_TYPE: &'static str = "InventoryUpdated";

    fn key(&self) -> String {
        self.order_id.to_string()
    }
}
