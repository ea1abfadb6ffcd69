//! Payment persistence contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bus::{Outbox, OutboxRecord, OutboxStatus};
use common::{CustomerId, OrderId, PaymentId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::PaymentError;
use crate::payment::Payment;

/// Persistence contract owned by the payment process.
///
/// The order ID is unique across payments; [`PaymentStore::insert`] enforces
/// it, which makes the exists-check race under concurrent redelivery resolve
/// to exactly one payment row.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists a new payment; fails with `AlreadyExists` if a payment for
    /// the same order exists.
    async fn insert(&self, payment: Payment) -> Result<(), PaymentError>;

    /// Persists an updated payment and its outbox records in one
    /// transaction.
    async fn update(
        &self,
        payment: Payment,
        outbox: Vec<OutboxRecord>,
    ) -> Result<(), PaymentError>;

    /// Loads a payment by ID.
    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, PaymentError>;

    /// Loads the payment for an order, if any.
    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Payment>, PaymentError>;

    /// Returns true if a payment exists for the order.
    async fn exists_by_order(&self, order_id: OrderId) -> Result<bool, PaymentError>;

    /// Loads all payments for a customer.
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Payment>, PaymentError>;

    /// Loads all payments.
    async fn find_all(&self) -> Result<Vec<Payment>, PaymentError>;
}

#[derive(Default)]
struct StoreState {
    payments: HashMap<PaymentId, Payment>,
    by_order: HashMap<OrderId, PaymentId>,
    outbox: Vec<OutboxRecord>,
}

/// In-memory payment store.
///
/// One lock over the payment maps and the outbox rows, mirroring a database
/// transaction including the unique constraint on the order ID.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryPaymentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored payments.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<(), PaymentError> {
        let mut state = self.state.write().await;

        if state.by_order.contains_key(&payment.order_id()) {
            return Err(PaymentError::AlreadyExists(payment.order_id()));
        }

        state.by_order.insert(payment.order_id(), payment.id());
        state.payments.insert(payment.id(), payment);
        Ok(())
    }

    async fn update(
        &self,
        payment: Payment,
        outbox: Vec<OutboxRecord>,
    ) -> Result<(), PaymentError> {
        let mut state = self.state.write().await;
        state.payments.insert(payment.id(), payment);
        state.outbox.extend(outbox);
        Ok(())
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, PaymentError> {
        let state = self.state.read().await;
        Ok(state.payments.get(&id).cloned())
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Payment>, PaymentError> {
        let state = self.state.read().await;
        Ok(state
            .by_order
            .get(&order_id)
            .and_then(|id| state.payments.get(id))
            .cloned())
    }

    async fn exists_by_order(&self, order_id: OrderId) -> Result<bool, PaymentError> {
        let state = self.state.read().await;
        Ok(state.by_order.contains_key(&order_id))
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Payment>, PaymentError> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| p.customer_id() == customer_id)
            .cloned()
            .collect();
        payments.sort_by_key(Payment::created_at);
        Ok(payments)
    }

    async fn find_all(&self) -> Result<Vec<Payment>, PaymentError> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state.payments.values().cloned().collect();
        payments.sort_by_key(Payment::created_at);
        Ok(payments)
    }
}

#[async_trait]
impl Outbox for InMemoryPaymentStore {
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

#[cfg(test)]
mod tests {
    use common::Money;

    use super::*;

    fn sample_payment(order_id: OrderId) -> Payment {
        Payment::processing(
            order_id,
            CustomerId::new(),
            Money::from_cents(1998),
            "AUTO",
        )
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = InMemoryPaymentStore::new();
        let payment = sample_payment(OrderId::new());
        let id = payment.id();
        let order_id = payment.order_id();

        store.insert(payment).await.unwrap();

        assert!(store.find(id).await.unwrap().is_some());
        assert!(store.find_by_order(order_id).await.unwrap().is_some());
        assert!(store.exists_by_order(order_id).await.unwrap());
    }

    #[tokio::test]
    async fn insert_rejects_second_payment_for_same_order() {
        let store = InMemoryPaymentStore::new();
        let order_id = OrderId::new();

        store.insert(sample_payment(order_id)).await.unwrap();
        let result = store.insert(sample_payment(order_id)).await;

        assert!(matches!(result, Err(PaymentError::AlreadyExists(id)) if id == order_id));
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn update_replaces_and_commits_outbox() {
        let store = InMemoryPaymentStore::new();
        let mut payment = sample_payment(OrderId::new());
        store.insert(payment.clone()).await.unwrap();

        payment.complete("TXN-ABCD1234".to_string());
        let record = OutboxRecord::pending(
            bus::Envelope::builder()
                .topic("payment-processed")
                .key(payment.order_id().to_string())
                .event_type("PaymentProcessed")
                .payload_raw(serde_json::json!({}))
                .build(),
        );
        store.update(payment.clone(), vec![record]).await.unwrap();

        let stored = store.find(payment.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), crate::PaymentStatus::Completed);
        assert_eq!(store.pending(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_by_customer_filters() {
        let store = InMemoryPaymentStore::new();
        let payment = sample_payment(OrderId::new());
        let customer = payment.customer_id();
        store.insert(payment).await.unwrap();
        store.insert(sample_payment(OrderId::new())).await.unwrap();

        assert_eq!(store.find_by_customer(customer).await.unwrap().len(), 1);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_lookups_return_none() {
        let store = InMemoryPaymentStore::new();
        assert!(store.find(PaymentId::new()).await.unwrap().is_none());
        assert!(store.find_by_order(OrderId::new()).await.unwrap().is_none());
        assert!(!store.exists_by_order(OrderId::new()).await.unwrap());
    }
}
