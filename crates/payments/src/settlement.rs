//! Deterministic settlement check.
//!
//! Stands in for a real payment gateway: the outcome is a pure function of
//! the amount, so tests are reproducible. Approve up to the limit, decline
//! above it with a fixed reason.

use common::Money;
use uuid::Uuid;

/// Largest amount the gateway approves ($10,000.00).
pub const APPROVAL_LIMIT: Money = Money::from_cents(1_000_000);

/// Fixed reason recorded on declined settlements.
pub const DECLINE_REASON: &str = "Insufficient funds";

/// Outcome of a settlement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Approved, with the assigned gateway transaction ID.
    Approved { transaction_id: String },

    /// Declined; no transaction ID is assigned.
    Declined { reason: String },
}

/// Settles an amount: approved iff `amount <= APPROVAL_LIMIT`.
pub fn settle(amount: Money) -> SettlementOutcome {
    if amount <= APPROVAL_LIMIT {
        SettlementOutcome::Approved {
            transaction_id: new_transaction_id(),
        }
    } else {
        SettlementOutcome::Declined {
            reason: DECLINE_REASON.to_string(),
        }
    }
}

fn new_transaction_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("TXN-{}", raw[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_at_limit_is_approved() {
        let outcome = settle(Money::from_cents(1_000_000));
        assert!(matches!(outcome, SettlementOutcome::Approved { .. }));
    }

    #[test]
    fn test_one_cent_over_limit_is_declined() {
        let outcome = settle(Money::from_cents(1_000_001));
        assert_eq!(
            outcome,
            SettlementOutcome::Declined {
                reason: DECLINE_REASON.to_string()
            }
        );
    }

    #[test]
    fn test_same_amount_always_yields_same_outcome() {
        for _ in 0..10 {
            assert!(matches!(
                settle(Money::from_cents(1998)),
                SettlementOutcome::Approved { .. }
            ));
            assert!(matches!(
                settle(Money::from_cents(1_500_000)),
                SettlementOutcome::Declined { .. }
            ));
        }
    }

    #[test]
    fn test_transaction_id_format() {
        let SettlementOutcome::Approved { transaction_id } = settle(Money::from_cents(100)) else {
            panic!("expected approval");
        };
        assert!(transaction_id.starts_with("TXN-"));
        assert_eq!(transaction_id.len(), "TXN-".len() + 8);
        assert_eq!(transaction_id, transaction_id.to_uppercase());
    }
}
