//! Transactional outbox building blocks.
//!
//! A process owner writes its aggregate and the events describing the change
//! in one store transaction; the relay publishes recorded events afterwards
//! and marks them sent. A crash between commit and publish therefore loses
//! nothing: the record stays pending and the next drain delivers it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Envelope, EventBus, Result};

/// Delivery state of an outbox record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    /// Committed with the aggregate, not yet published.
    Pending,
    /// Published to the bus.
    Sent,
}

/// An outbound event committed alongside the aggregate change it describes.
#[derive(Debug, Clone)]
pub struct OutboxRecord {
    /// Unique identifier for this record.
    pub id: Uuid,

    /// The envelope to publish.
    pub envelope: Envelope,

    /// Current delivery state.
    pub status: OutboxStatus,

    /// When the record was committed.
    pub enqueued_at: DateTime<Utc>,
}

impl OutboxRecord {
    /// Creates a pending record for an envelope.
    pub fn pending(envelope: Envelope) -> Self {
        Self {
            id: Uuid::new_v4(),
            envelope,
            status: OutboxStatus::Pending,
            enqueued_at: Utc::now(),
        }
    }
}

/// Drain contract implemented by each owner's store.
///
/// Records must be returned in enqueue order so the relay preserves per-key
/// publish order.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Returns up to `limit` pending records, oldest first.
    async fn pending(&self, limit: usize) -> Result<Vec<OutboxRecord>>;

    /// Marks a record as sent.
    async fn mark_sent(&self, id: Uuid) -> Result<()>;
}

/// Publishes pending outbox records to the bus.
///
/// One relay runs per process owner. A failed publish stops the drain with
/// the record still pending, so ordering holds and nothing is lost; the next
/// drain retries from the same record.
pub struct OutboxRelay<O, B> {
    outbox: O,
    bus: B,
    batch_size: usize,
}

impl<O, B> OutboxRelay<O, B>
where
    O: Outbox,
    B: EventBus,
{
    /// Creates a relay over an outbox and a bus.
    pub fn new(outbox: O, bus: B) -> Self {
        Self {
            outbox,
            bus,
            batch_size: 64,
        }
    }

    /// Drains all currently pending records, returning how many were sent.
    ///
    /// Stops at the first publish failure; the failing record stays pending.
    pub async fn drain(&self) -> Result<usize> {
        let mut sent = 0;

        loop {
            let batch = self.outbox.pending(self.batch_size).await?;
            if batch.is_empty() {
                return Ok(sent);
            }
            let batch_len = batch.len();

            for record in batch {
                match self.bus.publish(record.envelope.clone()).await {
                    Ok(receipt) => {
                        self.outbox.mark_sent(record.id).await?;
                        sent += 1;
                        metrics::counter!("outbox_relayed_total").increment(1);
                        tracing::debug!(
                            event_type = %record.envelope.event_type,
                            key = %record.envelope.key,
                            groups = receipt.groups,
                            "outbox record published"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            event_type = %record.envelope.event_type,
                            key = %record.envelope.key,
                            error = %e,
                            "publish failed, record stays pending"
                        );
                        return Ok(sent);
                    }
                }
            }

            if batch_len < self.batch_size {
                return Ok(sent);
            }
        }
    }
}

impl<O, B> OutboxRelay<O, B>
where
    O: Outbox + 'static,
    B: EventBus + 'static,
{
    /// Spawns a background task draining the outbox on a fixed period.
    pub fn spawn(self, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = self.drain().await {
                    tracing::error!(error = %e, "outbox drain failed");
                }
            }
        })
    }
}
