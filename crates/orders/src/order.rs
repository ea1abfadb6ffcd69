//! Order aggregate and its items.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};

use crate::error::OrderError;
use crate::state::OrderStatus;

/// An item in an order.
///
/// Owned exclusively by its order; items are immutable once the order is
/// created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the subtotal for this item (quantity × unit price).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Order aggregate root.
///
/// Created fully formed by [`Order::new`]; after creation only `status` and
/// `updated_at` ever change, and only through the store's conditional
/// transition. The item list and total are frozen at creation.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new PENDING order after validating the items.
    ///
    /// Fails when the item list is empty, any quantity is below one, or any
    /// unit price is not positive. The total is the exact sum of the item
    /// subtotals.
    pub fn new(customer_id: CustomerId, items: Vec<OrderItem>) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        for item in &items {
            if item.quantity < 1 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
            if !item.unit_price.is_positive() {
                return Err(OrderError::InvalidPrice {
                    product_id: item.product_id.clone(),
                    unit_price: item.unit_price,
                });
            }
        }

        let total_amount = items.iter().map(OrderItem::subtotal).sum();
        let now = Utc::now();

        Ok(Self {
            id: OrderId::new(),
            customer_id,
            status: OrderStatus::Pending,
            items,
            total_amount,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the customer who placed the order.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the ordered items.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the total amount.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the order was last updated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a status transition.
    ///
    /// Guards live in the store's conditional update; this only records the
    /// new status and touches `updated_at`.
    pub(crate) fn apply_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: u32, unit_price_cents: i64) -> OrderItem {
        OrderItem::new(
            "SKU-001",
            "Widget",
            quantity,
            Money::from_cents(unit_price_cents),
        )
    }

    #[test]
    fn test_create_order_computes_exact_total() {
        let order = Order::new(
            CustomerId::new(),
            vec![widget(2, 999), OrderItem::new("SKU-002", "Gadget", 3, Money::from_cents(500))],
        )
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount().cents(), 2 * 999 + 3 * 500);
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.created_at(), order.updated_at());
    }

    #[test]
    fn test_create_order_without_items_fails() {
        let result = Order::new(CustomerId::new(), vec![]);
        assert!(matches!(result, Err(OrderError::EmptyOrder)));
    }

    #[test]
    fn test_create_order_with_zero_quantity_fails() {
        let result = Order::new(CustomerId::new(), vec![widget(0, 999)]);
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_create_order_with_zero_price_fails() {
        let result = Order::new(CustomerId::new(), vec![widget(1, 0)]);
        assert!(matches!(result, Err(OrderError::InvalidPrice { .. })));
    }

    #[test]
    fn test_create_order_with_negative_price_fails() {
        let result = Order::new(CustomerId::new(), vec![widget(1, -100)]);
        assert!(matches!(result, Err(OrderError::InvalidPrice { .. })));
    }

    #[test]
    fn test_subtotal() {
        let item = widget(3, 1000);
        assert_eq!(item.subtotal().cents(), 3000);
    }

    #[test]
    fn test_apply_status_touches_updated_at() {
        let mut order = Order::new(CustomerId::new(), vec![widget(1, 100)]).unwrap();
        let created_at = order.created_at();

        order.apply_status(OrderStatus::PaymentCompleted);

        assert_eq!(order.status(), OrderStatus::PaymentCompleted);
        assert_eq!(order.created_at(), created_at);
        assert!(order.updated_at() >= created_at);
    }
}
