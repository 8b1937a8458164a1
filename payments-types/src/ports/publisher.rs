//! Event publisher port.

use crate::domain::PaymentEvent;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    Serialization(String),

    #[error("Failed to deliver event: {0}")]
    Transport(String),
}

/// Receives domain events after the aggregate that produced them was saved.
///
/// Called once per event, in the order the aggregate recorded them.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &PaymentEvent) -> Result<(), PublishError>;
}
