use thiserror::Error;

/// Errors that can occur when interacting with the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// Publishing an envelope to a topic failed.
    #[error("publish to topic '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    /// An event handler rejected or failed to process an envelope.
    ///
    /// The bus treats this as a signal to redeliver; it is never surfaced
    /// to the command that originally produced the event.
    #[error("handler failed: {0}")]
    Handler(String),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
