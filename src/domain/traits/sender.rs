use crate::application::errors::DeliveryError;
use crate::domain::entities::{OutboundMessage, Recipient};

/// Outbound side of a messaging platform adapter
pub trait MessageSender: Send + Sync {
    /// Deliver a message, blocking until the platform accepted or refused it
    fn send(&self, recipient: &Recipient, message: &OutboundMessage) -> Result<(), DeliveryError>;
}
