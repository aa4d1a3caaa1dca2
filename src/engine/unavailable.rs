//! Placeholder [`Engine`] wired into the binary in place of a real telephony SDK client.
//!
//! The engine SDK is an external collaborator out of this crate's scope (§1a): no
//! concrete client ships here. This type is the integration seam — a production
//! deployment links a real `Engine` implementation in its place. Every call fails
//! clearly rather than the binary silently doing nothing.

use async_trait::async_trait;
use serde_json::Value;

use super::{Engine, EngineError, EventSubscription, SystemInfo};
use crate::model::ResourceKey;

pub struct UnavailableEngine;

#[async_trait]
impl Engine for UnavailableEngine {
    async fn system_info(&self) -> Result<SystemInfo, EngineError> {
        Err(EngineError::other(
            "no engine implementation is linked; this build has no telephony SDK client configured",
        ))
    }

    fn application_name(&self) -> String {
        String::new()
    }

    async fn subscribe_events(&self) -> Result<Box<dyn EventSubscription>, EngineError> {
        Err(EngineError::other("no engine implementation is linked"))
    }

    async fn get(&self, _family: &str, _key: &ResourceKey) -> Result<Value, EngineError> {
        Err(EngineError::other("no engine implementation is linked"))
    }

    async fn list(&self, _family: &str, _key: &ResourceKey) -> Result<Value, EngineError> {
        Err(EngineError::other("no engine implementation is linked"))
    }

    async fn create(&self, _family: &str, _key: &ResourceKey, _payload: Value) -> Result<Value, EngineError> {
        Err(EngineError::other("no engine implementation is linked"))
    }

    async fn delete(&self, _family: &str, _key: &ResourceKey) -> Result<Value, EngineError> {
        Err(EngineError::other("no engine implementation is linked"))
    }

    async fn command(
        &self,
        _family: &str,
        _verb: &str,
        _key: &ResourceKey,
        _payload: Value,
    ) -> Result<Value, EngineError> {
        Err(EngineError::other("no engine implementation is linked"))
    }
}
