//! Bus consumer for the payment owner.

use std::sync::Arc;

use async_trait::async_trait;
use bus::{BusError, Envelope, EventBus, EventHandler};
use protocol::{OrderCreated, WireEvent, topics};

use crate::service::PaymentService;
use crate::store::PaymentStore;

/// Consumes OrderCreated events and triggers settlement.
pub struct PaymentEventConsumer<S: PaymentStore> {
    service: Arc<PaymentService<S>>,
}

impl<S: PaymentStore + 'static> PaymentEventConsumer<S> {
    /// Creates a consumer over a payment service.
    pub fn new(service: Arc<PaymentService<S>>) -> Self {
        Self { service }
    }

    /// Subscribes the payment owner's consumer group to its topic.
    pub async fn register(
        bus: &dyn EventBus,
        service: Arc<PaymentService<S>>,
    ) -> bus::Result<()> {
        let handler: Arc<dyn EventHandler> = Arc::new(Self::new(service));
        bus.subscribe(
            topics::ORDER_CREATED,
            topics::PAYMENT_SERVICE_GROUP,
            handler,
        )
        .await
    }
}

#[async_trait]
impl<S: PaymentStore> EventHandler for PaymentEventConsumer<S> {
    async fn handle(&self, envelope: &Envelope) -> bus::Result<()> {
        match envelope.event_type.as_str() {
            OrderCreated::EVENT_TYPE => {
                let event: OrderCreated = envelope.decode()?;
                tracing::info!(
                    order_id = %event.order_id,
                    amount = %event.total_amount,
                    "received OrderCreated"
                );
                self.service
                    .handle_order_created(&event)
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
