// src/publish.rs

/// Errors that can occur when handing a reply to the transport
#[derive(Debug)]
pub enum PublishError {
    Client(String),
    Closed,
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::Client(msg) => write!(f, "publish failed: {}", msg),
            PublishError::Closed => write!(f, "transport closed"),
        }
    }
}

impl std::error::Error for PublishError {}

/// Trait for publishing replies (abstracts the MQTT client).
///
/// Publishing is fire-and-forget: an `Ok` means the transport accepted the
/// message, not that any subscriber received it.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError>;
}
