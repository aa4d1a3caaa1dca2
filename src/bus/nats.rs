//! [`Bus`] implementation backed by a real NATS connection.

use async_trait::async_trait;
use futures::StreamExt;

use super::{Bus, BusError, Message, Subscription};

pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = async_nats::connect(url).await.map_err(|e| BusError::Connect(e.to_string()))?;
        Ok(Self { client })
    }
}

struct NatsSubscription {
    inner: async_nats::Subscriber,
}

#[async_trait]
impl Subscription for NatsSubscription {
    async fn recv(&mut self) -> Option<Message> {
        let message = self.inner.next().await?;
        Some(Message {
            subject: message.subject.to_string(),
            reply: message.reply.map(|s| s.to_string()),
            payload: message.payload.to_vec(),
        })
    }

    async fn unsubscribe(&mut self) {
        let _ = self.inner.unsubscribe().await;
    }
}

#[async_trait]
impl Bus for NatsBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| BusError::Publish(e.to_string()))
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, BusError> {
        let inner =
            self.client.subscribe(subject.to_string()).await.map_err(|e| BusError::Subscribe(e.to_string()))?;
        Ok(Box::new(NatsSubscription { inner }))
    }

    async fn queue_subscribe(&self, subject: &str, queue_group: &str) -> Result<Box<dyn Subscription>, BusError> {
        let inner = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| BusError::Subscribe(e.to_string()))?;
        Ok(Box::new(NatsSubscription { inner }))
    }
}
