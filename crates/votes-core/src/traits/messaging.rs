//! Messaging traits (ports) - publish typed messages, consume with ack/nack
//!
//! Delivery is at-least-once: a message is redelivered until a consumer acks it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;

pub type MessagingResult<T> = Result<T, DomainError>;

/// A message type bound to the topic it travels on
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TOPIC: &'static str;

    /// Unique id of this message, stable across redeliveries
    fn message_id(&self) -> Uuid;

    fn encode(&self) -> MessagingResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| DomainError::SerializationError(e.to_string()))
    }

    fn decode(payload: &[u8]) -> MessagingResult<Self> {
        serde_json::from_slice(payload).map_err(|e| DomainError::SerializationError(e.to_string()))
    }
}

#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish an encoded payload. Returns the bus-assigned id once accepted.
    async fn publish_raw(&self, topic: &str, payload: Vec<u8>) -> MessagingResult<String>;
}

/// Encode and publish a typed message
pub async fn publish<M: Message>(
    publisher: &dyn MessagePublisher,
    message: &M,
) -> MessagingResult<String> {
    let payload = message.encode()?;
    publisher.publish_raw(M::TOPIC, payload).await
}

#[async_trait]
pub trait MessageSubscriber: Send + Sync {
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn Subscription>>;
}

/// An open subscription. Must be closed to release it.
#[async_trait]
pub trait Subscription: Send {
    /// Wait for the next delivery; `None` once the subscription has ended
    async fn next(&mut self) -> MessagingResult<Option<Box<dyn Delivery>>>;

    async fn close(self: Box<Self>) -> MessagingResult<()>;
}

/// One delivery of a message
#[async_trait]
pub trait Delivery: Send {
    fn payload(&self) -> &[u8];

    /// Bus-assigned id
    fn delivery_id(&self) -> &str;

    /// How many times this message has been delivered, this time included
    fn attempt(&self) -> u32;

    /// Confirm processing; the message will not be delivered again
    async fn ack(self: Box<Self>) -> MessagingResult<()>;

    /// Give the message back for redelivery
    async fn nack(self: Box<Self>) -> MessagingResult<()>;
}

/// Handles one message type
#[async_trait]
pub trait MessageHandler<M: Message>: Send + Sync {
    async fn handle(&self, message: M) -> Result<(), DomainError>;
}
