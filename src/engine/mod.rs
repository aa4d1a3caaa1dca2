//! The abstract telephony engine SDK surface this proxy consumes.
//!
//! No concrete engine implementation ships in this crate — it is an external
//! collaborator. [`fake`] provides an in-memory stand-in used only by tests.

pub mod event;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod unavailable;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::ResourceKey;

pub use event::EngineEvent;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("resource not found")]
    NotFound,
    #[error("engine error: {0}")]
    Other(String),
}

impl EngineError {
    pub fn other(message: impl Into<String>) -> Self {
        EngineError::Other(message.into())
    }
}

/// System identity reported by the engine at boot (`Asterisk.Info("")`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub entity_id: String,
}

/// A live subscription to the engine's event bus; `cancel` stops delivery.
#[async_trait]
pub trait EventSubscription: Send {
    async fn recv(&mut self) -> Option<EngineEvent>;
    fn cancel(&mut self);
}

/// The opaque SDK surface: system info, event bus, and per-family resource verbs.
///
/// Resource accessors are intentionally generic (`get`/`list`/`create`/`delete`/
/// `command`) rather than one method per resource family — the per-kind translation is
/// the dispatcher's job (§4.F); the engine only needs to know how to address a family by
/// name and act on a `ResourceKey` plus an opaque JSON payload.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn system_info(&self) -> Result<SystemInfo, EngineError>;
    fn application_name(&self) -> String;

    async fn subscribe_events(&self) -> Result<Box<dyn EventSubscription>, EngineError>;

    async fn get(&self, family: &str, key: &ResourceKey) -> Result<Value, EngineError>;
    async fn list(&self, family: &str, key: &ResourceKey) -> Result<Value, EngineError>;
    async fn create(&self, family: &str, key: &ResourceKey, payload: Value) -> Result<Value, EngineError>;
    async fn delete(&self, family: &str, key: &ResourceKey) -> Result<Value, EngineError>;
    async fn command(
        &self,
        family: &str,
        verb: &str,
        key: &ResourceKey,
        payload: Value,
    ) -> Result<Value, EngineError>;
}
