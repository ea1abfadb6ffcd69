//! HTTP command surface and process wiring for the order choreography
//! system.
//!
//! Exposes REST endpoints for both process owners with structured logging
//! (tracing) and Prometheus metrics, and wires the in-memory stores, bus
//! subscriptions, and outbox relays together.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use bus::{InMemoryEventBus, OutboxRelay};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderStore, OrderEventConsumer, OrderService, OrderStore};
use payments::{InMemoryPaymentStore, PaymentEventConsumer, PaymentService, PaymentStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<O, P>(state: Arc<AppState<O, P>>, metrics_handle: PrometheusHandle) -> Router
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/orders", post(routes::orders::create::<O, P>))
        .route("/api/orders", get(routes::orders::list::<O, P>))
        .route("/api/orders/{id}", get(routes::orders::get::<O, P>))
        .route(
            "/api/orders/customer/{customer_id}",
            get(routes::orders::list_by_customer::<O, P>),
        )
        .route(
            "/api/orders/{id}/cancel",
            patch(routes::orders::cancel::<O, P>),
        )
        .route("/api/payments", post(routes::payments::create::<O, P>))
        .route("/api/payments", get(routes::payments::list::<O, P>))
        .route("/api/payments/{id}", get(routes::payments::get::<O, P>))
        .route(
            "/api/payments/order/{order_id}",
            get(routes::payments::get_by_order::<O, P>),
        )
        .route(
            "/api/payments/customer/{customer_id}",
            get(routes::payments::list_by_customer::<O, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Fully wired application: shared state plus the pieces the binary (and
/// tests) drive directly.
pub struct Wiring {
    pub state: Arc<AppState<InMemoryOrderStore, InMemoryPaymentStore>>,
    pub bus: InMemoryEventBus,
    pub order_relay: OutboxRelay<InMemoryOrderStore, InMemoryEventBus>,
    pub payment_relay: OutboxRelay<InMemoryPaymentStore, InMemoryEventBus>,
}

/// Creates the default in-memory wiring: stores, services, consumer-group
/// subscriptions, and one outbox relay per process owner.
pub async fn create_default_state(bus: InMemoryEventBus) -> bus::Result<Wiring> {
    let order_store = InMemoryOrderStore::new();
    let payment_store = InMemoryPaymentStore::new();

    let order_service = OrderService::new(order_store.clone());
    let payment_service = PaymentService::new(payment_store.clone());

    OrderEventConsumer::register(&bus, Arc::new(order_service.clone())).await?;
    PaymentEventConsumer::register(&bus, Arc::new(payment_service.clone())).await?;

    let order_relay = OutboxRelay::new(order_store, bus.clone());
    let payment_relay = OutboxRelay::new(payment_store, bus.clone());

    let state = Arc::new(AppState {
        orders: order_service,
        payments: payment_service,
    });

    Ok(Wiring {
        state,
        bus,
        order_relay,
        payment_relay,
    })
}
