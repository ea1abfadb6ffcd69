//! Order command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CustomerId, Money, OrderId};
use orders::{Order, OrderItem, OrderService, OrderStore};
use payments::{PaymentService, PaymentStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<O: OrderStore, P: PaymentStore> {
    pub orders: OrderService<O>,
    pub payments: PaymentService<P>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub total_cents: i64,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

fn order_response(order: &Order) -> OrderResponse {
    let items = order
        .items()
        .iter()
        .map(|item| OrderItemResponse {
            product_id: item.product_id.to_string(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            subtotal_cents: item.subtotal().cents(),
        })
        .collect();

    OrderResponse {
        id: order.id().to_string(),
        customer_id: order.customer_id().to_string(),
        status: order.status().to_string(),
        total_cents: order.total_amount().cents(),
        items,
        created_at: order.created_at().to_rfc3339(),
        updated_at: order.updated_at().to_rfc3339(),
    }
}

pub(crate) fn parse_uuid(id: &str, what: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("invalid {what}: {e}")))
}

// -- Handlers --

/// POST /api/orders — place a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let customer_id = CustomerId::from_uuid(parse_uuid(&req.customer_id, "customer_id")?);

    let items: Vec<OrderItem> = req
        .items
        .into_iter()
        .map(|item| {
            OrderItem::new(
                item.product_id,
                item.product_name,
                item.quantity,
                Money::from_cents(item.unit_price_cents),
            )
        })
        .collect();

    let order = state.orders.create_order(customer_id, items).await?;
    Ok((StatusCode::CREATED, Json(order_response(&order))))
}

/// GET /api/orders/{id} — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let order_id = OrderId::from_uuid(parse_uuid(&id, "order id")?);
    let order = state.orders.get_order(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// GET /api/orders — list all orders.
#[tracing::instrument(skip(state))]
pub async fn list<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let orders = state.orders.list_all().await?;
    Ok(Json(orders.iter().map(order_response).collect()))
}

/// GET /api/orders/customer/{customer_id} — list a customer's orders.
#[tracing::instrument(skip(state))]
pub async fn list_by_customer<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let customer_id = CustomerId::from_uuid(parse_uuid(&customer_id, "customer_id")?);
    let orders = state.orders.list_by_customer(customer_id).await?;
    Ok(Json(orders.iter().map(order_response).collect()))
}

/// PATCH /api/orders/{id}/cancel — cancel an order.
#[tracing::instrument(skip(state))]
pub async fn cancel<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let order_id = OrderId::from_uuid(parse_uuid(&id, "order id")?);
    let order = state.orders.cancel_order(order_id).await?;
    Ok(Json(order_response(&order)))
}
