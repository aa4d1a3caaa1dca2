//! Boot-fatal error taxonomy (§7): surfaced as `Supervisor::listen`'s return value,
//! never swallowed.

use crate::bus::BusError;
use crate::engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("engine connect failed: {0}")]
    EngineConnect(String),
    #[error("bus connect failed: {0}")]
    BusConnect(#[from] BusError),
    #[error("engine reported an empty entity id")]
    EmptyEntityId,
    #[error("failed to query engine system info: {0}")]
    SystemInfo(EngineError),
    #[error("subscription failed: {0}")]
    Subscription(String),
    #[error("event subscription failed: {0}")]
    EventSubscription(EngineError),
}
