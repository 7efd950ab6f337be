use crate::delivery::DeliveryError;
use crate::message::Message;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Trait for delivering a relayed message to its destination chat
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Deliverer: Send + Sync {
    /// Deliver the message text to the configured chat
    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError>;
}
