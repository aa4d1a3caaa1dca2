//! The abstract pub/sub bus transport this proxy publishes to and subscribes on.

pub mod envelope;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod nats;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("bus connect failed: {0}")]
    Connect(String),
    #[error("bus publish failed: {0}")]
    Publish(String),
    #[error("bus subscribe failed: {0}")]
    Subscribe(String),
}

/// A message delivered to a subscription, carrying an optional reply subject (the
/// bus's request/reply convention).
#[derive(Debug, Clone)]
pub struct Message {
    pub subject: String,
    pub reply: Option<String>,
    pub payload: Vec<u8>,
}

/// A live subscription; `unsubscribe` is idempotent and safe to call more than once.
#[async_trait]
pub trait Subscription: Send {
    async fn recv(&mut self) -> Option<Message>;
    async fn unsubscribe(&mut self);
}

/// The opaque pub/sub transport: JSON-over-subjects, wildcards, queue groups.
#[async_trait]
pub trait Bus: Send + Sync {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError>;
    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, BusError>;
    async fn queue_subscribe(&self, subject: &str, queue_group: &str) -> Result<Box<dyn Subscription>, BusError>;
}
