//! Bus consumer for the order owner.

use std::sync::Arc;

use async_trait::async_trait;
use bus::{BusError, Envelope, EventBus, EventHandler};
use protocol::{InventoryUpdated, PaymentProcessed, WireEvent, topics};

use crate::service::OrderService;
use crate::store::OrderStore;

/// Consumes payment and inventory outcome events for the order owner.
///
/// One consumer handles both topics; the order service's conditional
/// transitions make it safe under redelivery.
pub struct OrderEventConsumer<S: OrderStore> {
    service: Arc<OrderService<S>>,
}

impl<S: OrderStore + 'static> OrderEventConsumer<S> {
    /// Creates a consumer over an order service.
    pub fn new(service: Arc<OrderService<S>>) -> Self {
        Self { service }
    }

    /// Subscribes the order owner's consumer group to its topics.
    pub async fn register(
        bus: &dyn EventBus,
        service: Arc<OrderService<S>>,
    ) -> bus::Result<()> {
        let handler: Arc<dyn EventHandler> = Arc::new(Self::new(service));
        bus.subscribe(
            topics::PAYMENT_PROCESSED,
            topics::ORDER_SERVICE_GROUP,
            handler.clone(),
        )
        .await?;
        bus.subscribe(
            topics::INVENTORY_UPDATED,
            topics::ORDER_SERVICE_GROUP,
            handler,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl<S: OrderStore> EventHandler for OrderEventConsumer<S> {
    async fn handle(&self, envelope: &Envelope) -> bus::Result<()> {
        match envelope.event_type.as_str() {
            PaymentProcessed::EVENT_TYPE => {
                let event: PaymentProcessed = envelope.decode()?;
                tracing::info!(
                    order_id = %event.order_id,
                    success = event.success,
                    "received PaymentProcessed"
                );
                self.service
                    .apply_payment_outcome(&event)
                    .await
                    .map_err(|e| BusError::Handler(e.to_string()))?;
            }
            InventoryUpdated::EVENT_TYPE => {
                let event: InventoryUpdated = envelope.decode()?;
                tracing::info!(
                    order_id = %event.order_id,
                    success = event.success,
                    "received InventoryUpdated"
                );
                self.service
                    .apply_inventory_outcome(&event)
                    .await
                    .map_err(|e| BusError::Handler(e.to_string()))?;
            }
            other => {
                tracing::debug!(event_type = other, "ignoring unrecognized event");
            }
        }
        Ok(())
    }
}
