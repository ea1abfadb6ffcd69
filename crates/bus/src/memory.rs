use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{DeliveryReceipt, Envelope, EventBus, EventHandler, Result};

/// Default number of immediate redeliveries after a handler failure.
const DEFAULT_MAX_REDELIVERIES: u32 = 2;

type GroupMembers = Vec<Arc<dyn EventHandler>>;

#[derive(Default)]
struct BusState {
    /// topic -> group id -> members competing for that topic.
    groups: HashMap<String, HashMap<String, GroupMembers>>,
}

/// In-memory event bus for testing and single-process deployments.
///
/// Reproduces the delivery contract of a partitioned broker:
/// - each envelope goes to exactly one member per consumer group, selected
///   by a stable hash of the partition key (so one key always lands on the
///   same member while membership is unchanged);
/// - a handler failure triggers bounded immediate redelivery, after which
///   the envelope is logged and dropped (at-least-once, not guaranteed
///   processing);
/// - envelopes are dispatched on the publisher's task in publish order, so
///   per-key ordering within a group holds by construction.
#[derive(Clone)]
pub struct InMemoryEventBus {
    state: Arc<RwLock<BusState>>,
    max_redeliveries: u32,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventBus {
    /// Creates a new bus with the default redelivery budget.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(BusState::default())),
            max_redeliveries: DEFAULT_MAX_REDELIVERIES,
        }
    }

    /// Creates a bus with a custom redelivery budget.
    pub fn with_max_redeliveries(max_redeliveries: u32) -> Self {
        Self {
            state: Arc::new(RwLock::new(BusState::default())),
            max_redeliveries,
        }
    }

    /// Returns the number of consumer groups subscribed to a topic.
    pub async fn group_count(&self, topic: &str) -> usize {
        let state = self.state.read().await;
        state.groups.get(topic).map(|g| g.len()).unwrap_or(0)
    }

    fn member_for_key(members: &GroupMembers, key: &str) -> Arc<dyn EventHandler> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % members.len();
        members[index].clone()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: Envelope) -> Result<DeliveryReceipt> {
        // Snapshot the membership, then dispatch without holding the lock
        // so handlers can publish follow-up events.
        let targets: Vec<(String, Arc<dyn EventHandler>)> = {
            let state = self.state.read().await;
            state
                .groups
                .get(&envelope.topic)
                .map(|groups| {
                    groups
                        .iter()
                        .filter(|(_, members)| !members.is_empty())
                        .map(|(group_id, members)| {
                            (group_id.clone(), Self::member_for_key(members, &envelope.key))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        metrics::counter!("bus_events_published_total").increment(1);

        let mut groups = 0;
        for (group_id, handler) in targets {
            let mut attempt = 0;
            loop {
                match handler.handle(&envelope).await {
                    Ok(()) => break,
                    Err(e) if attempt < self.max_redeliveries => {
                        attempt += 1;
                        metrics::counter!("bus_events_redelivered_total").increment(1);
                        tracing::warn!(
                            topic = %envelope.topic,
                            key = %envelope.key,
                            group = %group_id,
                            attempt,
                            error = %e,
                            "handler failed, redelivering"
                        );
                    }
                    Err(e) => {
                        // Redelivery budget exhausted: log and drop. The
                        // consumer process stays alive.
                        metrics::counter!("bus_events_dropped_total").increment(1);
                        tracing::error!(
                            topic = %envelope.topic,
                            key = %envelope.key,
                            group = %group_id,
                            error = %e,
                            "handler failed after redelivery, dropping"
                        );
                        break;
                    }
                }
            }
            groups += 1;
        }

        Ok(DeliveryReceipt { groups })
    }

    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .groups
            .entry(topic.to_string())
            .or_default()
            .entry(group_id.to_string())
            .or_default()
            .push(handler);

        tracing::debug!(topic, group = group_id, "consumer registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::BusError;

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn keys(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, envelope: &Envelope) -> Result<()> {
            self.seen.lock().unwrap().push(envelope.key.clone());
            Ok(())
        }
    }

    /// Fails a fixed number of times before succeeding.
    struct Flaky {
        failures_left: AtomicU32,
        handled: AtomicU32,
    }

    #[async_trait]
    impl EventHandler for Flaky {
        async fn handle(&self, _envelope: &Envelope) -> Result<()> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(BusError::Handler("transient".to_string()));
            }
            Ok(())
        }
    }

    fn envelope(topic: &str, key: &str) -> Envelope {
        Envelope::builder()
            .topic(topic)
            .key(key)
            .event_type("Test")
            .payload_raw(serde_json::json!({}))
            .build()
    }

    #[tokio::test]
    async fn delivers_to_every_group_once() {
        let bus = InMemoryEventBus::new();
        let group_a = Recorder::new();
        let group_b = Recorder::new();

        bus.subscribe("orders", "a", group_a.clone()).await.unwrap();
        bus.subscribe("orders", "b", group_b.clone()).await.unwrap();

        let receipt = bus.publish(envelope("orders", "k1")).await.unwrap();

        assert_eq!(receipt.groups, 2);
        assert_eq!(group_a.keys(), vec!["k1"]);
        assert_eq!(group_b.keys(), vec!["k1"]);
    }

    #[tokio::test]
    async fn only_one_member_of_a_group_receives_each_envelope() {
        let bus = InMemoryEventBus::new();
        let member_1 = Recorder::new();
        let member_2 = Recorder::new();

        bus.subscribe("orders", "g", member_1.clone()).await.unwrap();
        bus.subscribe("orders", "g", member_2.clone()).await.unwrap();

        for _ in 0..4 {
            bus.publish(envelope("orders", "same-key")).await.unwrap();
        }

        let total = member_1.keys().len() + member_2.keys().len();
        assert_eq!(total, 4);
        // Stable assignment: one key always lands on the same member.
        assert!(member_1.keys().is_empty() || member_2.keys().is_empty());
    }

    #[tokio::test]
    async fn preserves_per_key_publish_order() {
        let bus = InMemoryEventBus::new();
        let recorder = Recorder::new();
        bus.subscribe("orders", "g", recorder.clone()).await.unwrap();

        for key in ["k1", "k1", "k2", "k1"] {
            bus.publish(envelope("orders", key)).await.unwrap();
        }

        let k1_positions: Vec<_> = recorder
            .keys()
            .iter()
            .enumerate()
            .filter(|(_, k)| k.as_str() == "k1")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(k1_positions, vec![0, 1, 3]);
    }

    #[tokio::test]
    async fn redelivers_on_handler_failure() {
        let bus = InMemoryEventBus::new();
        let flaky = Arc::new(Flaky {
            failures_left: AtomicU32::new(2),
            handled: AtomicU32::new(0),
        });
        bus.subscribe("orders", "g", flaky.clone()).await.unwrap();

        bus.publish(envelope("orders", "k")).await.unwrap();

        // Two failures, then success on the final redelivery.
        assert_eq!(flaky.handled.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn drops_after_redelivery_budget_without_crashing() {
        let bus = InMemoryEventBus::with_max_redeliveries(1);
        let flaky = Arc::new(Flaky {
            failures_left: AtomicU32::new(10),
            handled: AtomicU32::new(0),
        });
        bus.subscribe("orders", "g", flaky.clone()).await.unwrap();

        let receipt = bus.publish(envelope("orders", "k")).await.unwrap();

        assert_eq!(receipt.groups, 1);
        assert_eq!(flaky.handled.load(Ordering::SeqCst), 2);

        // The bus still delivers subsequent envelopes.
        bus.publish(envelope("orders", "k")).await.unwrap();
        assert_eq!(flaky.handled.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn publish_without_subscribers_reports_zero_groups() {
        let bus = InMemoryEventBus::new();
        let receipt = bus.publish(envelope("nowhere", "k")).await.unwrap();
        assert_eq!(receipt.groups, 0);
    }

    #[tokio::test]
    async fn group_count_reflects_subscriptions() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.group_count("orders").await, 0);

        bus.subscribe("orders", "a", Recorder::new()).await.unwrap();
        bus.subscribe("orders", "b", Recorder::new()).await.unwrap();
        assert_eq!(bus.group_count("orders").await, 2);
    }
}
