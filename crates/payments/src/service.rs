//! Payment service: settlement from events or direct commands, plus queries.

use bus::OutboxRecord;
use chrono::Utc;
use common::{CustomerId, Money, OrderId, PaymentId};
use protocol::{OrderCreated, PaymentProcessed, WireEvent};

use crate::error::PaymentError;
use crate::payment::{Payment, PaymentStatus};
use crate::settlement::{self, SettlementOutcome};
use crate::store::PaymentStore;

/// Payment method recorded for event-triggered settlements.
const AUTO_METHOD: &str = "AUTO";

/// Message carried on successful PaymentProcessed events.
const SUCCESS_MESSAGE: &str = "Payment processed successfully";

/// Direct settlement command, the synchronous equivalent of consuming an
/// OrderCreated event.
#[derive(Debug, Clone)]
pub struct ProcessPaymentRequest {
    /// The order to settle.
    pub order_id: OrderId,

    /// The paying customer.
    pub customer_id: CustomerId,

    /// Amount to settle.
    pub amount: Money,

    /// Payment method chosen by the caller.
    pub payment_method: String,
}

/// Service owning all payment operations.
#[derive(Clone)]
pub struct PaymentService<S: PaymentStore> {
    store: S,
}

impl<S: PaymentStore> PaymentService<S> {
    /// Creates a new payment service over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Settles the payment for a freshly created order.
    ///
    /// Idempotent under redelivery: if a payment already exists for the
    /// order this is a no-op returning `None`. Otherwise a PROCESSING
    /// payment is persisted, the settlement check runs, and the terminal
    /// payment is committed together with its PaymentProcessed record.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id, amount = %event.total_amount))]
    pub async fn handle_order_created(
        &self,
        event: &OrderCreated,
    ) -> Result<Option<Payment>, PaymentError> {
        if self.store.exists_by_order(event.order_id).await? {
            tracing::info!("payment already exists for order, skipping settlement");
            return Ok(None);
        }

        let payment = Payment::processing(
            event.order_id,
            event.customer_id,
            event.total_amount,
            AUTO_METHOD,
        );

        // The unique order-id insert closes the window between the exists
        // check and this write under concurrent redelivery.
        match self.store.insert(payment.clone()).await {
            Ok(()) => {}
            Err(PaymentError::AlreadyExists(_)) => {
                tracing::info!("lost settlement race for order, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let payment = self.settle_and_record(payment).await?;
        Ok(Some(payment))
    }

    /// Settles a payment by direct command.
    ///
    /// Fails with `AlreadyExists` when a payment for the order exists.
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id, amount = %request.amount))]
    pub async fn process_payment(
        &self,
        request: ProcessPaymentRequest,
    ) -> Result<Payment, PaymentError> {
        let payment = Payment::processing(
            request.order_id,
            request.customer_id,
            request.amount,
            request.payment_method,
        );

        self.store.insert(payment.clone()).await?;
        self.settle_and_record(payment).await
    }

    /// Runs the settlement check and commits the terminal payment together
    /// with its PaymentProcessed outbox record.
    async fn settle_and_record(&self, mut payment: Payment) -> Result<Payment, PaymentError> {
        match settlement::settle(payment.amount()) {
            SettlementOutcome::Approved { transaction_id } => {
                payment.complete(transaction_id);
                metrics::counter!("payments_settled_total").increment(1);
                tracing::info!(order_id = %payment.order_id(), "payment completed");
            }
            SettlementOutcome::Declined { reason } => {
                payment.fail(reason);
                metrics::counter!("payments_declined_total").increment(1);
                tracing::warn!(order_id = %payment.order_id(), "payment failed");
            }
        }

        let success = payment.status() == PaymentStatus::Completed;
        let event = PaymentProcessed {
            order_id: payment.order_id(),
            payment_id: payment.id(),
            success,
            message: if success {
                SUCCESS_MESSAGE.to_string()
            } else {
                payment
                    .failure_reason()
                    .unwrap_or(settlement::DECLINE_REASON)
                    .to_string()
            },
            processed_at: payment.processed_at().unwrap_or_else(Utc::now),
        };
        let record = OutboxRecord::pending(event.to_envelope()?);

        self.store.update(payment.clone(), vec![record]).await?;
        Ok(payment)
    }

    /// Loads a payment by ID, failing with NotFound if absent.
    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<Payment, PaymentError> {
        self.store
            .find(payment_id)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    /// Loads the payment for an order, failing if none exists.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_order(&self, order_id: OrderId) -> Result<Payment, PaymentError> {
        self.store
            .find_by_order(order_id)
            .await?
            .ok_or(PaymentError::NotFoundForOrder(order_id))
    }

    /// Lists all payments for a customer.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Payment>, PaymentError> {
        self.store.find_by_customer(customer_id).await
    }

    /// Lists all payments.
    pub async fn list_all(&self) -> Result<Vec<Payment>, PaymentError> {
        self.store.find_all().await
    }
}
