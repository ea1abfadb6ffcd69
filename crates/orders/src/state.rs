//! Order lifecycle state machine.

/// The status of an order in its lifecycle.
///
/// Transitions:
/// ```text
/// Pending ──► PaymentCompleted ──► Completed
///    │               │
///    │               └──────────► InventoryFailed
///    ├──────► PaymentFailed
///    │
///    └── any status except Completed/Cancelled ──► Cancelled (command only)
/// ```
///
/// Completed and Cancelled accept nothing further. PaymentFailed and
/// InventoryFailed are dead ends for event-driven transitions (there is no
/// retry path) but can still be cancelled by command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting the payment outcome.
    #[default]
    Pending,

    /// Payment settled, awaiting the inventory outcome.
    PaymentCompleted,

    /// Payment was declined (dead end).
    PaymentFailed,

    /// Inventory reserved, order fulfilled (terminal).
    Completed,

    /// Inventory reservation failed (dead end).
    InventoryFailed,

    /// Order was cancelled by command (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Statuses a cancel command may transition from.
    pub const CANCELLABLE: &'static [OrderStatus] = &[
        OrderStatus::Pending,
        OrderStatus::PaymentCompleted,
        OrderStatus::PaymentFailed,
        OrderStatus::InventoryFailed,
    ];

    /// Returns true if a cancel command is allowed in this status.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns true if a payment outcome may be applied in this status.
    pub fn awaits_payment(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if an inventory outcome may be applied in this status.
    pub fn awaits_inventory(&self) -> bool {
        matches!(self, OrderStatus::PaymentCompleted)
    }

    /// Returns true if no event-driven transition can leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Cancelled
                | OrderStatus::PaymentFailed
                | OrderStatus::InventoryFailed
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PaymentCompleted => "PAYMENT_COMPLETED",
            OrderStatus::PaymentFailed => "PAYMENT_FAILED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::InventoryFailed => "INVENTORY_FAILED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
