//! An in-memory [`Engine`] used only by tests to drive the scenarios in spec §8.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Engine, EngineError, EngineEvent, EventSubscription, SystemInfo};
use crate::model::ResourceKey;

pub struct FakeEngine {
    entity_id: String,
    application: String,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
    resources: Mutex<std::collections::HashMap<String, Value>>,
}

impl FakeEngine {
    pub fn new(entity_id: impl Into<String>, application: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            entity_id: entity_id.into(),
            application: application.into(),
            events_tx: tx,
            events_rx: Mutex::new(Some(rx)),
            resources: Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn seed(&self, id: impl Into<String>, value: Value) {
        self.resources.lock().insert(id.into(), value);
    }

    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events_tx.send(event);
    }
}

struct FakeSubscription {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
    cancelled: bool,
}

#[async_trait]
impl EventSubscription for FakeSubscription {
    async fn recv(&mut self) -> Option<EngineEvent> {
        if self.cancelled {
            return None;
        }
        self.rx.recv().await
    }

    fn cancel(&mut self) {
        self.cancelled = true;
        self.rx.close();
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn system_info(&self) -> Result<SystemInfo, EngineError> {
        Ok(SystemInfo { entity_id: self.entity_id.clone() })
    }

    fn application_name(&self) -> String {
        self.application.clone()
    }

    async fn subscribe_events(&self) -> Result<Box<dyn EventSubscription>, EngineError> {
        let rx = self
            .events_rx
            .lock()
            .take()
            .ok_or_else(|| EngineError::other("fake engine supports a single subscriber"))?;
        Ok(Box::new(FakeSubscription { rx, cancelled: false }))
    }

    async fn get(&self, _family: &str, key: &ResourceKey) -> Result<Value, EngineError> {
        self.resources.lock().get(&key.id).cloned().ok_or(EngineError::NotFound)
    }

    async fn list(&self, _family: &str, _key: &ResourceKey) -> Result<Value, EngineError> {
        let values: Vec<Value> = self.resources.lock().values().cloned().collect();
        Ok(Value::Array(values))
    }

    async fn create(&self, _family: &str, key: &ResourceKey, payload: Value) -> Result<Value, EngineError> {
        self.resources.lock().insert(key.id.clone(), payload.clone());
        Ok(payload)
    }

    async fn delete(&self, _family: &str, key: &ResourceKey) -> Result<Value, EngineError> {
        self.resources
            .lock()
            .remove(&key.id)
            .ok_or(EngineError::NotFound)
            .map(|_| Value::Null)
    }

    async fn command(
        &self,
        _family: &str,
        _verb: &str,
        key: &ResourceKey,
        _payload: Value,
    ) -> Result<Value, EngineError> {
        if self.resources.lock().contains_key(&key.id) {
            Ok(Value::Null)
        } else {
            Err(EngineError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let engine = FakeEngine::new("node-A", "demo");
        let err = engine.get("channel", &ResourceKey { id: "missing".into(), ..Default::default() }).await;
        assert!(matches!(err, Err(EngineError::NotFound)));
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let engine = FakeEngine::new("node-A", "demo");
        let key = ResourceKey { id: "c1".into(), ..Default::default() };
        engine.create("channel", &key, serde_json::json!({"id": "c1"})).await.unwrap();
        let value = engine.get("channel", &key).await.unwrap();
        assert_eq!(value["id"], "c1");
    }
}
