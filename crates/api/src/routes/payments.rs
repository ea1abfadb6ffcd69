//! Payment command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CustomerId, Money, OrderId, PaymentId};
use orders::OrderStore;
use payments::{Payment, PaymentStore, ProcessPaymentRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_uuid};

// -- Request types --

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub payment_method: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: String,
    pub processed_at: Option<String>,
}

fn payment_response(payment: &Payment) -> PaymentResponse {
    PaymentResponse {
        id: payment.id().to_string(),
        order_id: payment.order_id().to_string(),
        customer_id: payment.customer_id().to_string(),
        amount_cents: payment.amount().cents(),
        status: payment.status().to_string(),
        payment_method: payment.payment_method().to_string(),
        transaction_id: payment.transaction_id().map(String::from),
        failure_reason: payment.failure_reason().map(String::from),
        created_at: payment.created_at().to_rfc3339(),
        processed_at: payment.processed_at().map(|t| t.to_rfc3339()),
    }
}

// -- Handlers --

/// POST /api/payments — settle a payment by direct command.
#[tracing::instrument(skip(state, req))]
pub async fn create<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Json(req): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let request = ProcessPaymentRequest {
        order_id: OrderId::from_uuid(parse_uuid(&req.order_id, "order_id")?),
        customer_id: CustomerId::from_uuid(parse_uuid(&req.customer_id, "customer_id")?),
        amount: Money::from_cents(req.amount_cents),
        payment_method: req.payment_method,
    };

    let payment = state.payments.process_payment(request).await?;
    Ok((StatusCode::CREATED, Json(payment_response(&payment))))
}

/// GET /api/payments/{id} — load a payment by ID.
#[tracing::instrument(skip(state))]
pub async fn get<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let payment_id = PaymentId::from_uuid(parse_uuid(&id, "payment id")?);
    let payment = state.payments.get_payment(payment_id).await?;
    Ok(Json(payment_response(&payment)))
}

/// GET /api/payments/order/{order_id} — load the payment for an order.
#[tracing::instrument(skip(state))]
pub async fn get_by_order<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Path(order_id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let order_id = OrderId::from_uuid(parse_uuid(&order_id, "order id")?);
    let payment = state.payments.get_by_order(order_id).await?;
    Ok(Json(payment_response(&payment)))
}

/// GET /api/payments — list all payments.
#[tracing::instrument(skip(state))]
pub async fn list<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let payments = state.payments.list_all().await?;
    Ok(Json(payments.iter().map(payment_response).collect()))
}

/// GET /api/payments/customer/{customer_id} — list a customer's payments.
#[tracing::instrument(skip(state))]
pub async fn list_by_customer<O, P>(
    State(state): State<Arc<AppState<O, P>>>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError>
where
    O: OrderStore + 'static,
    P: PaymentStore + 'static,
{
    let customer_id = CustomerId::from_uuid(parse_uuid(&customer_id, "customer_id")?);
    let payments = state.payments.list_by_customer(customer_id).await?;
    Ok(Json(payments.iter().map(payment_response).collect()))
}
