//! Order service: commands, queries, and outcome-event application.

use bus::OutboxRecord;
use common::{CustomerId, OrderId};
use protocol::{
    InventoryUpdated, OrderCancelled, OrderCreated, OrderItemData, PaymentProcessed, WireEvent,
};

use crate::error::OrderError;
use crate::order::{Order, OrderItem};
use crate::state::OrderStatus;
use crate::store::{OrderStore, TransitionOutcome};

/// Reason recorded on command-driven cancellations.
pub const CANCEL_REASON: &str = "Customer requested cancellation";

/// Service owning all order operations.
///
/// Commands validate and persist synchronously; outbound events are written
/// to the store's outbox in the same transaction and published later by the
/// relay. Outcome events from other owners are applied through conditional
/// status transitions, so redeliveries and stale deliveries are no-ops.
#[derive(Clone)]
pub struct OrderService<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an order in PENDING status.
    ///
    /// Validation happens before any side effect; the PENDING order and its
    /// OrderCreated record are committed atomically.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<Order, OrderError> {
        let order = Order::new(customer_id, items)?;

        let event = OrderCreated {
            order_id: order.id(),
            customer_id,
            total_amount: order.total_amount(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemData {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
            created_at: order.created_at(),
        };
        let record = OutboxRecord::pending(event.to_envelope()?);

        self.store.insert(order.clone(), vec![record]).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order created");

        Ok(order)
    }

    /// Cancels an order.
    ///
    /// Fails with NotFound for an unknown ID and with CannotCancel when the
    /// order is already COMPLETED or CANCELLED. The transition and the
    /// OrderCancelled record are committed atomically.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let event = OrderCancelled {
            order_id,
            reason: CANCEL_REASON.to_string(),
        };
        let record = OutboxRecord::pending(event.to_envelope()?);

        match self
            .store
            .transition_if(
                order_id,
                OrderStatus::CANCELLABLE,
                OrderStatus::Cancelled,
                vec![record],
            )
            .await?
        {
            TransitionOutcome::Applied(order) => {
                metrics::counter!("orders_cancelled_total").increment(1);
                tracing::info!(%order_id, "order cancelled");
                Ok(order)
            }
            TransitionOutcome::Ignored { current } => {
                Err(OrderError::CannotCancel { status: current })
            }
            TransitionOutcome::NotFound => Err(OrderError::NotFound(order_id)),
        }
    }

    /// Applies a payment outcome consumed from the bus.
    ///
    /// The transition only applies from PENDING; a redelivered event finds
    /// the order already transitioned and is ignored. An unknown order is
    /// dropped with a warning, never treated as fatal: it may not be
    /// committed yet under rare reordering, or may legitimately not exist.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, success = event.success))]
    pub async fn apply_payment_outcome(
        &self,
        event: &PaymentProcessed,
    ) -> Result<TransitionOutcome, OrderError> {
        let next = if event.success {
            OrderStatus::PaymentCompleted
        } else {
            OrderStatus::PaymentFailed
        };

        let outcome = self
            .store
            .transition_if(event.order_id, &[OrderStatus::Pending], next, vec![])
            .await?;

        match &outcome {
            TransitionOutcome::Applied(_) => {
                if event.success {
                    tracing::info!("payment completed for order");
                } else {
                    tracing::warn!(message = %event.message, "payment failed for order");
                }
            }
            TransitionOutcome::Ignored { current } => {
                tracing::debug!(%current, "payment outcome already applied or stale, ignoring");
            }
            TransitionOutcome::NotFound => {
                tracing::warn!("payment outcome for unknown order, dropping");
            }
        }

        Ok(outcome)
    }

    /// Applies an inventory outcome consumed from the bus.
    ///
    /// Same idempotency discipline as payment outcomes; the transition only
    /// applies from PAYMENT_COMPLETED.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, success = event.success))]
    pub async fn apply_inventory_outcome(
        &self,
        event: &InventoryUpdated,
    ) -> Result<TransitionOutcome, OrderError> {
        let next = if event.success {
            OrderStatus::Completed
        } else {
            OrderStatus::InventoryFailed
        };

        let outcome = self
            .store
            .transition_if(
                event.order_id,
                &[OrderStatus::PaymentCompleted],
                next,
                vec![],
            )
            .await?;

        match &outcome {
            TransitionOutcome::Applied(_) => {
                if event.success {
                    tracing::info!("inventory reserved, order completed");
                } else {
                    tracing::warn!(message = %event.message, "inventory update failed for order");
                }
            }
            TransitionOutcome::Ignored { current } => {
                tracing::debug!(%current, "inventory outcome already applied or stale, ignoring");
            }
            TransitionOutcome::NotFound => {
                tracing::warn!("inventory outcome for unknown order, dropping");
            }
        }

        Ok(outcome)
    }

    /// Loads an order by ID, failing with NotFound if absent.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.store
            .find(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Lists all orders for a customer.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, OrderError> {
        self.store.find_by_customer(customer_id).await
    }

    /// Lists all orders.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        self.store.find_all().await
    }
}
