use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An envelope carrying an event across process owners.
///
/// Delivery is at-least-once: consumers may see the same envelope more than
/// once and must be idempotent. Ordering is guaranteed only among envelopes
/// sharing a `key`; there is no cross-key ordering guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique identifier for this envelope.
    pub event_id: EventId,

    /// The topic this envelope is addressed to.
    pub topic: String,

    /// Partition key (correlation ID). All events for one order carry the
    /// order ID here so they stay ordered relative to each other.
    pub key: String,

    /// The type of the event (e.g., "OrderCreated").
    pub event_type: String,

    /// The event payload as JSON.
    pub payload: serde_json::Value,

    /// When the envelope was created.
    pub published_at: DateTime<Utc>,
}

impl Envelope {
    /// Creates a new envelope builder.
    pub fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::default()
    }

    /// Deserializes the payload into a concrete event type.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Builder for constructing envelopes.
#[derive(Debug, Default)]
pub struct EnvelopeBuilder {
    event_id: Option<EventId>,
    topic: Option<String>,
    key: Option<String>,
    event_type: Option<String>,
    payload: Option<serde_json::Value>,
}

impl EnvelopeBuilder {
    /// Sets the topic.
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the partition key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the envelope.
    ///
    /// # Panics
    ///
    /// Panics if required fields (topic, key, event_type, payload) are not set.
    pub fn build(self) -> Envelope {
        Envelope {
            event_id: self.event_id.unwrap_or_default(),
            topic: self.topic.expect("topic is required"),
            key: self.key.expect("key is required"),
            event_type: self.event_type.expect("event_type is required"),
            payload: self.payload.expect("payload is required"),
            published_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_new_creates_unique_ids() {
        let id1 = EventId::new();
        let id2 = EventId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn envelope_builder() {
        let payload = serde_json::json!({"order_id": "abc"});

        let envelope = Envelope::builder()
            .topic("order-created")
            .key("abc")
            .event_type("OrderCreated")
            .payload_raw(payload.clone())
            .build();

        assert_eq!(envelope.topic, "order-created");
        assert_eq!(envelope.key, "abc");
        assert_eq!(envelope.event_type, "OrderCreated");
        assert_eq!(envelope.payload, payload);
    }

    #[test]
    fn envelope_decode_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Sample {
            value: i32,
        }

        let envelope = Envelope::builder()
            .topic("t")
            .key("k")
            .event_type("Sample")
            .payload(&Sample { value: 42 })
            .unwrap()
            .build();

        let decoded: Sample = envelope.decode().unwrap();
        assert_eq!(decoded, Sample { value: 42 });
    }

    #[test]
    #[should_panic(expected = "topic is required")]
    fn envelope_build_panics_on_missing_topic() {
        Envelope::builder().key("k").build();
    }
}
