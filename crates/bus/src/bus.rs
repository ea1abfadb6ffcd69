use std::sync::Arc;

use async_trait::async_trait;

use crate::{Envelope, Result};

/// Completion signal for a publish, strictly for observability.
///
/// A publish failure must never roll back the aggregate write that produced
/// the event; callers log the receipt (or the error) and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Number of consumer groups the envelope was handed to.
    pub groups: usize,
}

/// Handler for envelopes delivered to a consumer-group member.
///
/// Delivery is at-least-once: the same envelope can arrive again after a
/// handler failure, a crash, or a rebalance. Implementations must be
/// side-effect-idempotent: check current aggregate state before applying a
/// transition rather than assuming first delivery wins.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Processes one envelope.
    ///
    /// Returning an error reports failure to the bus so it can redeliver;
    /// it must not crash the consumer.
    async fn handle(&self, envelope: &Envelope) -> Result<()>;
}

/// Core trait for event bus implementations.
///
/// Topic-addressed, partition-keyed publish/subscribe with competing
/// consumer groups. Ordering is preserved per key within a group; there is
/// no cross-key guarantee.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes an envelope to its topic.
    ///
    /// At-least-once semantics. The receipt is for observability only.
    async fn publish(&self, envelope: Envelope) -> Result<DeliveryReceipt>;

    /// Registers a handler as a member of `group_id` on `topic`.
    ///
    /// Each envelope on the topic is delivered to exactly one member of
    /// each group.
    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<()>;
}
