//! One module per resource family (§4.F), each a thin translator from a closed `Kind`
//! to a generic engine call. Per-resource translation logic itself is an external
//! collaborator (§1c); these modules only route.

pub mod application;
pub mod asterisk;
pub mod asterisk_config;
pub mod asterisk_logging;
pub mod asterisk_module;
pub mod bridge;
pub mod channel;
pub mod device_state;
pub mod endpoint;
pub mod mailbox;
pub mod playback;
pub mod recording_live;
pub mod recording_stored;
pub mod sound;

use tokio::sync::watch;

use crate::engine::Engine;
use crate::model::{Reply, Request};

use super::{Family, Kind};

/// Routes to the family's handler, carrying the shutdown signal through so every
/// in-flight engine call can observe cancellation (§5).
pub async fn handle(engine: &dyn Engine, kind: Kind, request: &Request, cancel: watch::Receiver<bool>) -> Reply {
    match kind.family() {
        Family::Application => application::handle(engine, kind, request, cancel).await,
        Family::Asterisk => asterisk::handle(engine, kind, request, cancel).await,
        Family::AsteriskConfig => asterisk_config::handle(engine, kind, request, cancel).await,
        Family::AsteriskLogging => asterisk_logging::handle(engine, kind, request, cancel).await,
        Family::AsteriskModule => asterisk_module::handle(engine, kind, request, cancel).await,
        Family::Bridge => bridge::handle(engine, kind, request, cancel).await,
        Family::Channel => channel::handle(engine, kind, request, cancel).await,
        Family::DeviceState => device_state::handle(engine, kind, request, cancel).await,
        Family::Endpoint => endpoint::handle(engine, kind, request, cancel).await,
        Family::Mailbox => mailbox::handle(engine, kind, request, cancel).await,
        Family::Playback => playback::handle(engine, kind, request, cancel).await,
        Family::RecordingLive => recording_live::handle(engine, kind, request, cancel).await,
        Family::RecordingStored => recording_stored::handle(engine, kind, request, cancel).await,
        Family::Sound => sound::handle(engine, kind, request, cancel).await,
    }
}
