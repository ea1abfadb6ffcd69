//! Order persistence contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bus::{Outbox, OutboxRecord, OutboxStatus};
use common::{CustomerId, OrderId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::OrderError;
use crate::order::Order;
use crate::state::OrderStatus;

/// Result of a conditional status transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// The update applied; the order is returned post-transition.
    Applied(Order),

    /// The current status was not in the allowed set; nothing was written.
    /// This is how a redelivered or stale event becomes a no-op.
    Ignored { current: OrderStatus },

    /// No order with this ID exists.
    NotFound,
}

/// Persistence contract owned by the order process.
///
/// Writes that emit events take the outbox records in the same call so the
/// implementation can commit aggregate and events atomically. Event-driven
/// status changes go through [`OrderStore::transition_if`], a conditional
/// update on the current status, never read-modify-write, which is unsafe
/// under concurrent redelivery.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order and its outbox records in one transaction.
    async fn insert(&self, order: Order, outbox: Vec<OutboxRecord>) -> Result<(), OrderError>;

    /// Loads an order by ID.
    async fn find(&self, id: OrderId) -> Result<Option<Order>, OrderError>;

    /// Loads all orders for a customer.
    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError>;

    /// Loads all orders.
    async fn find_all(&self) -> Result<Vec<Order>, OrderError>;

    /// Sets the status to `next` only if the current status is in `allowed`,
    /// writing `outbox` in the same transaction when it applies.
    ///
    /// When the transition does not apply, nothing is written, including
    /// the outbox records.
    async fn transition_if(
        &self,
        id: OrderId,
        allowed: &[OrderStatus],
        next: OrderStatus,
        outbox: Vec<OutboxRecord>,
    ) -> Result<TransitionOutcome, OrderError>;
}

#[derive(Default)]
struct StoreState {
    orders: HashMap<OrderId, Order>,
    outbox: Vec<OutboxRecord>,
}

/// In-memory order store.
///
/// A single lock covers the order map and the outbox rows, giving the same
/// atomicity a database transaction would: an order change and the events
/// describing it become visible together or not at all.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order, outbox: Vec<OutboxRecord>) -> Result<(), OrderError> {
        let mut state = self.state.write().await;
        state.orders.insert(order.id(), order);
        state.outbox.extend(outbox);
        Ok(())
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        let state = self.state.read().await;
        Ok(state.orders.get(&id).cloned())
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.customer_id() == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(Order::created_at);
        Ok(orders)
    }

    async fn find_all(&self) -> Result<Vec<Order>, OrderError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by_key(Order::created_at);
        Ok(orders)
    }

    async fn transition_if(
        &self,
        id: OrderId,
        allowed: &[OrderStatus],
        next: OrderStatus,
        outbox: Vec<OutboxRecord>,
    ) -> Result<TransitionOutcome, OrderError> {
        let mut state = self.state.write().await;

        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(TransitionOutcome::NotFound);
        };

        let current = order.status();
        if !allowed.contains(&current) {
            return Ok(TransitionOutcome::Ignored { current });
        }

        order.apply_status(next);
        let updated = order.clone();
        state.outbox.extend(outbox);

        Ok(TransitionOutcome::Applied(updated))
    }
}

#[async_trait]
impl Outbox for InMemoryOrderStore {
    async fn pending(&self, limit: usize) -> bus::Result<Vec<OutboxRecord>> {
        let state = self.state.read().await;
        Ok(state
            .outbox
            .iter()
            .filter(|r| r.status == OutboxStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: Uuid) -> bus::Result<()> {
        let mut state = self.state.write().await;
        if let Some(record) = state.outbox.iter_mut().find(|r| r.id == id) {
            record.status = OutboxStatus::Sent;
        }
        Ok(())
    }
}
