//! End-to-end choreography tests across both process owners.
//!
//! The owners are wired exactly as in the binary (shared bus, one outbox
//! relay each) but the relays are drained explicitly so every step is
//! deterministic.

use std::sync::Arc;

use bus::{EventBus, InMemoryEventBus, Outbox, OutboxRelay};
use common::{CustomerId, Money, OrderId};
use orders::{
    InMemoryOrderStore, OrderEventConsumer, OrderItem, OrderService, OrderStatus,
};
use payments::{InMemoryPaymentStore, PaymentEventConsumer, PaymentService, PaymentStatus};
use protocol::{InventoryUpdated, WireEvent};

struct Harness {
    bus: InMemoryEventBus,
    order_store: InMemoryOrderStore,
    payment_store: InMemoryPaymentStore,
    orders: Arc<OrderService<InMemoryOrderStore>>,
    payments: Arc<PaymentService<InMemoryPaymentStore>>,
    order_relay: OutboxRelay<InMemoryOrderStore, InMemoryEventBus>,
    payment_relay: OutboxRelay<InMemoryPaymentStore, InMemoryEventBus>,
}

async fn setup() -> Harness {
    let bus = InMemoryEventBus::new();
    let order_store = InMemoryOrderStore::new();
    let payment_store = InMemoryPaymentStore::new();

    let orders = Arc::new(OrderService::new(order_store.clone()));
    let payments = Arc::new(PaymentService::new(payment_store.clone()));

    OrderEventConsumer::register(&bus, orders.clone()).await.unwrap();
    PaymentEventConsumer::register(&bus, payments.clone())
        .await
        .unwrap();

    Harness {
        order_relay: OutboxRelay::new(order_store.clone(), bus.clone()),
        payment_relay: OutboxRelay::new(payment_store.clone(), bus.clone()),
        bus,
        order_store,
        payment_store,
        orders,
        payments,
    }
}

impl Harness {
    async fn place_order(&self, unit_price_cents: i64, quantity: u32) -> OrderId {
        self.orders
            .create_order(
                CustomerId::new(),
                vec![OrderItem::new(
                    "p1",
                    "Widget",
                    quantity,
                    Money::from_cents(unit_price_cents),
                )],
            )
            .await
            .unwrap()
            .id()
    }

    async fn deliver_inventory_outcome(&self, order_id: OrderId, success: bool) {
        let event = InventoryUpdated {
            order_id,
            success,
            message: if success {
                "Inventory reserved".to_string()
            } else {
                "Out of stock".to_string()
            },
            updated_at: chrono::Utc::now(),
        };
        self.bus.publish(event.to_envelope().unwrap()).await.unwrap();
    }
}

#[tokio::test]
async fn happy_path_reaches_payment_completed_then_completed() {
    let harness = setup().await;

    // Two Widgets at 9.99 each.
    let order_id = harness.place_order(999, 2).await;

    let order = harness.orders.get_order(order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.total_amount().cents(), 1998);

    // The OrderCreated record is committed but not yet published.
    assert_eq!(harness.order_store.pending(10).await.unwrap().len(), 1);

    // Relay publishes OrderCreated; the payment owner settles 19.98 inline.
    assert_eq!(harness.order_relay.drain().await.unwrap(), 1);

    let payment = harness.payments.get_by_order(order_id).await.unwrap();
    assert_eq!(payment.status(), PaymentStatus::Completed);
    assert_eq!(payment.amount().cents(), 1998);

    // Relay publishes PaymentProcessed; the order owner applies it.
    assert_eq!(harness.payment_relay.drain().await.unwrap(), 1);
    assert_eq!(
        harness.orders.get_order(order_id).await.unwrap().status(),
        OrderStatus::PaymentCompleted
    );

    // The external inventory owner reports success; order completes.
    harness.deliver_inventory_outcome(order_id, true).await;
    assert_eq!(
        harness.orders.get_order(order_id).await.unwrap().status(),
        OrderStatus::Completed
    );
}

#[tokio::test]
async fn declined_payment_ends_in_payment_failed_and_stays_there() {
    let harness = setup().await;

    // Gadget at 15000.00, over the settlement limit.
    let order_id = harness.place_order(1_500_000, 1).await;

    harness.order_relay.drain().await.unwrap();
    harness.payment_relay.drain().await.unwrap();

    let payment = harness.payments.get_by_order(order_id).await.unwrap();
    assert_eq!(payment.status(), PaymentStatus::Failed);
    assert_eq!(payment.failure_reason(), Some("Insufficient funds"));

    let order = harness.orders.get_order(order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::PaymentFailed);

    // A later inventory event must be a no-op given the state guard.
    harness.deliver_inventory_outcome(order_id, true).await;
    assert_eq!(
        harness.orders.get_order(order_id).await.unwrap().status(),
        OrderStatus::PaymentFailed
    );
}

#[tokio::test]
async fn inventory_failure_ends_in_inventory_failed() {
    let harness = setup().await;
    let order_id = harness.place_order(999, 2).await;

    harness.order_relay.drain().await.unwrap();
    harness.payment_relay.drain().await.unwrap();

    harness.deliver_inventory_outcome(order_id, false).await;
    assert_eq!(
        harness.orders.get_order(order_id).await.unwrap().status(),
        OrderStatus::InventoryFailed
    );
}

#[tokio::test]
async fn redelivered_order_created_settles_exactly_once() {
    let harness = setup().await;
    let order_id = harness.place_order(999, 2).await;

    harness.order_relay.drain().await.unwrap();

    // Simulate broker redelivery of the already-published OrderCreated.
    let order = harness.orders.get_order(order_id).await.unwrap();
    let event = protocol::OrderCreated {
        order_id,
        customer_id: order.customer_id(),
        total_amount: order.total_amount(),
        items: vec![],
        created_at: order.created_at(),
    };
    harness
        .bus
        .publish(event.to_envelope().unwrap())
        .await
        .unwrap();

    assert_eq!(harness.payments.list_all().await.unwrap().len(), 1);
    // Exactly one PaymentProcessed record was ever written.
    assert_eq!(harness.payment_store.pending(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn redelivered_payment_processed_does_not_double_transition() {
    let harness = setup().await;
    let order_id = harness.place_order(999, 2).await;

    harness.order_relay.drain().await.unwrap();

    // Deliver the same PaymentProcessed record twice.
    let record = harness.payment_store.pending(10).await.unwrap().remove(0);
    harness.bus.publish(record.envelope.clone()).await.unwrap();
    harness.bus.publish(record.envelope).await.unwrap();

    assert_eq!(
        harness.orders.get_order(order_id).await.unwrap().status(),
        OrderStatus::PaymentCompleted
    );
}

#[tokio::test]
async fn cancelled_order_emits_order_cancelled() {
    let harness = setup().await;
    let order_id = harness.place_order(999, 2).await;

    harness.order_relay.drain().await.unwrap();
    harness.orders.cancel_order(order_id).await.unwrap();

    let pending = harness.order_store.pending(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].envelope.event_type, "OrderCancelled");
    assert_eq!(pending[0].envelope.key, order_id.to_string());
}

#[tokio::test]
async fn payment_completed_order_cannot_complete_without_inventory() {
    let harness = setup().await;
    let order_id = harness.place_order(999, 2).await;

    harness.order_relay.drain().await.unwrap();
    harness.payment_relay.drain().await.unwrap();

    // PAYMENT_COMPLETED is not terminal, but only an inventory outcome
    // moves it forward.
    let order = harness.orders.get_order(order_id).await.unwrap();
    assert_eq!(order.status(), OrderStatus::PaymentCompleted);
    assert!(!order.status().is_terminal());
}
