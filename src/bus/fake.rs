//! An in-process [`Bus`] used only by tests — exact-subject matching with queue-group
//! election, no real wildcard subject algebra (our subject space never needs one: scope
//! segments are literal empty strings, not NATS wildcard tokens).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{Bus, BusError, Message, Subscription};

struct Entry {
    id: u64,
    queue_group: Option<String>,
    tx: mpsc::UnboundedSender<Message>,
}

pub struct FakeBus {
    self_ref: Weak<FakeBus>,
    subs: Mutex<HashMap<String, Vec<Entry>>>,
    next_id: AtomicU64,
}

impl FakeBus {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            subs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }

    fn arc(&self) -> Arc<FakeBus> {
        self.self_ref.upgrade().expect("FakeBus outlives its own subscriptions")
    }

    fn register(&self, subject: &str, queue_group: Option<String>) -> (u64, mpsc::UnboundedReceiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subs.lock().entry(subject.to_string()).or_default().push(Entry { id, queue_group, tx });
        (id, rx)
    }

    fn deregister(&self, subject: &str, id: u64) {
        if let Some(entries) = self.subs.lock().get_mut(subject) {
            entries.retain(|e| e.id != id);
        }
    }
}

struct FakeSubscription {
    bus: Arc<FakeBus>,
    subject: String,
    id: u64,
    rx: mpsc::UnboundedReceiver<Message>,
}

#[async_trait]
impl Subscription for FakeSubscription {
    async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    async fn unsubscribe(&mut self) {
        self.bus.deregister(&self.subject, self.id);
    }
}

impl FakeBus {
    /// Publishes with an explicit reply subject, modeling the real bus's out-of-band
    /// reply-to convention (a NATS header under a real connection) for tests that need
    /// to exercise the request/reply path.
    pub async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        self.deliver(subject, Some(reply.to_string()), payload)
    }

    fn deliver(&self, subject: &str, reply: Option<String>, payload: Vec<u8>) -> Result<(), BusError> {
        let entries = self.subs.lock();
        let Some(entries) = entries.get(subject) else { return Ok(()) };

        let mut elected: HashMap<&str, &Entry> = HashMap::new();
        let mut broadcast: Vec<&Entry> = Vec::new();
        for entry in entries {
            match &entry.queue_group {
                None => broadcast.push(entry),
                Some(group) => {
                    elected.entry(group.as_str()).or_insert(entry);
                }
            }
        }

        for entry in broadcast.into_iter().chain(elected.into_values()) {
            let message =
                Message { subject: subject.to_string(), reply: reply.clone(), payload: payload.clone() };
            let _ = entry.tx.send(message);
        }
        Ok(())
    }
}

#[async_trait]
impl Bus for FakeBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.deliver(subject, None, payload)
    }

    async fn subscribe(&self, subject: &str) -> Result<Box<dyn Subscription>, BusError> {
        let (id, rx) = self.register(subject, None);
        Ok(Box::new(FakeSubscription { bus: self.arc(), subject: subject.to_string(), id, rx }))
    }

    async fn queue_subscribe(&self, subject: &str, queue_group: &str) -> Result<Box<dyn Subscription>, BusError> {
        let (id, rx) = self.register(subject, Some(queue_group.to_string()));
        Ok(Box::new(FakeSubscription { bus: self.arc(), subject: subject.to_string(), id, rx }))
    }
}
