//! Payment aggregate.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, PaymentId};

/// The status of a payment.
///
/// A payment is created in PROCESSING and mutated exactly once, to COMPLETED
/// or FAILED. It is never re-created for the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    /// Recorded but settlement has not started.
    #[default]
    Pending,

    /// Settlement in progress.
    Processing,

    /// Settlement succeeded (terminal).
    Completed,

    /// Settlement was declined (terminal).
    Failed,
}

impl PaymentStatus {
    /// Returns true if settlement has finished, either way.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment aggregate root.
///
/// Invariants: `transaction_id` is present iff COMPLETED, `failure_reason`
/// iff FAILED, `processed_at` iff terminal. They hold by construction since
/// the only mutations are [`Payment::complete`] and [`Payment::fail`].
#[derive(Debug, Clone)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    customer_id: CustomerId,
    amount: Money,
    status: PaymentStatus,
    payment_method: String,
    transaction_id: Option<String>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Creates a payment in PROCESSING for an order.
    pub fn processing(
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            order_id,
            customer_id,
            amount,
            status: PaymentStatus::Processing,
            payment_method: payment_method.into(),
            transaction_id: None,
            failure_reason: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    /// Marks the payment COMPLETED with its gateway transaction ID.
    pub(crate) fn complete(&mut self, transaction_id: String) {
        self.status = PaymentStatus::Completed;
        self.transaction_id = Some(transaction_id);
        self.processed_at = Some(Utc::now());
    }

    /// Marks the payment FAILED with the decline reason.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.processed_at = Some(Utc::now());
    }

    /// Returns the payment ID.
    pub fn id(&self) -> PaymentId {
        self.id
    }

    /// Returns the correlated order ID.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Returns the paying customer.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the amount settled.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the current status.
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Returns the payment method.
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    /// Returns the gateway transaction ID (present iff COMPLETED).
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// Returns the decline reason (present iff FAILED).
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns when the payment was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when settlement finished (present iff terminal).
    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }
}
