//! Request dispatch: matches a request's `kind` to a per-resource-family handler and
//! launches it asynchronously so slow handlers never block new request acceptance.

pub mod handlers;

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::warn;

use crate::bus::{Bus, envelope};
use crate::engine::{Engine, EngineError};
use crate::model::{Reply, Request};

/// The generic engine operation a `Kind` maps to; handlers never need more than this.
pub enum Operation {
    List,
    Get,
    Create,
    Delete,
    Command(&'static str),
}

/// Resource families grouping the closed `Kind` set, purely for readability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Application,
    Asterisk,
    AsteriskConfig,
    AsteriskLogging,
    AsteriskModule,
    Bridge,
    Channel,
    DeviceState,
    Endpoint,
    Mailbox,
    Playback,
    RecordingLive,
    RecordingStored,
    Sound,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Application => "application",
            Family::Asterisk => "asterisk",
            Family::AsteriskConfig => "asteriskConfig",
            Family::AsteriskLogging => "asteriskLogging",
            Family::AsteriskModule => "asteriskModule",
            Family::Bridge => "bridge",
            Family::Channel => "channel",
            Family::DeviceState => "deviceState",
            Family::Endpoint => "endpoint",
            Family::Mailbox => "mailbox",
            Family::Playback => "playback",
            Family::RecordingLive => "recordingLive",
            Family::RecordingStored => "recordingStored",
            Family::Sound => "sound",
        }
    }
}

macro_rules! kind_enum {
    ( $( $variant:ident => $wire:literal , $family:expr , $op:expr ; )+ ) => {
        /// The closed discriminator set a request's `kind` is matched against.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Kind {
            $( $variant, )+
        }

        impl Kind {
            pub fn family(&self) -> Family {
                match self {
                    $( Kind::$variant => $family, )+
                }
            }

            pub fn operation(&self) -> Operation {
                match self {
                    $( Kind::$variant => $op, )+
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Kind::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for Kind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for Kind {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Kind::$variant), )+
                    _ => Err(()),
                }
            }
        }
    };
}

kind_enum! {
    ApplicationList => "ApplicationList", Family::Application, Operation::List;
    ApplicationData => "ApplicationData", Family::Application, Operation::Get;
    ApplicationSubscribe => "ApplicationSubscribe", Family::Application, Operation::Command("subscribe");
    ApplicationUnsubscribe => "ApplicationUnsubscribe", Family::Application, Operation::Command("unsubscribe");

    AsteriskInfo => "AsteriskInfo", Family::Asterisk, Operation::Get;
    AsteriskPing => "AsteriskPing", Family::Asterisk, Operation::Command("ping");
    AsteriskVariableGet => "AsteriskVariableGet", Family::Asterisk, Operation::Command("variableGet");
    AsteriskVariableSet => "AsteriskVariableSet", Family::Asterisk, Operation::Command("variableSet");

    AsteriskConfigData => "AsteriskConfigData", Family::AsteriskConfig, Operation::Get;
    AsteriskConfigUpdate => "AsteriskConfigUpdate", Family::AsteriskConfig, Operation::Command("update");
    AsteriskConfigDelete => "AsteriskConfigDelete", Family::AsteriskConfig, Operation::Delete;

    AsteriskLoggingList => "AsteriskLoggingList", Family::AsteriskLogging, Operation::List;
    AsteriskLoggingData => "AsteriskLoggingData", Family::AsteriskLogging, Operation::Get;
    AsteriskLoggingAdd => "AsteriskLoggingAdd", Family::AsteriskLogging, Operation::Create;
    AsteriskLoggingDelete => "AsteriskLoggingDelete", Family::AsteriskLogging, Operation::Delete;
    AsteriskLoggingRotate => "AsteriskLoggingRotate", Family::AsteriskLogging, Operation::Command("rotate");

    AsteriskModuleList => "AsteriskModuleList", Family::AsteriskModule, Operation::List;
    AsteriskModuleData => "AsteriskModuleData", Family::AsteriskModule, Operation::Get;
    AsteriskModuleLoad => "AsteriskModuleLoad", Family::AsteriskModule, Operation::Command("load");
    AsteriskModuleUnload => "AsteriskModuleUnload", Family::AsteriskModule, Operation::Command("unload");
    AsteriskModuleReload => "AsteriskModuleReload", Family::AsteriskModule, Operation::Command("reload");

    BridgeList => "BridgeList", Family::Bridge, Operation::List;
    BridgeCreate => "BridgeCreate", Family::Bridge, Operation::Create;
    BridgeData => "BridgeData", Family::Bridge, Operation::Get;
    BridgeDestroy => "BridgeDestroy", Family::Bridge, Operation::Delete;
    BridgeAddChannel => "BridgeAddChannel", Family::Bridge, Operation::Command("addChannel");
    BridgeRemoveChannel => "BridgeRemoveChannel", Family::Bridge, Operation::Command("removeChannel");
    BridgePlay => "BridgePlay", Family::Bridge, Operation::Command("play");
    BridgePlayWithId => "BridgePlayWithId", Family::Bridge, Operation::Command("playWithId");
    BridgeRecord => "BridgeRecord", Family::Bridge, Operation::Command("record");
    BridgeStartMoh => "BridgeStartMoh", Family::Bridge, Operation::Command("startMoh");
    BridgeStopMoh => "BridgeStopMoh", Family::Bridge, Operation::Command("stopMoh");
    BridgeClearVideoSource => "BridgeClearVideoSource", Family::Bridge, Operation::Command("clearVideoSource");

    ChannelList => "ChannelList", Family::Channel, Operation::List;
    ChannelOriginate => "ChannelOriginate", Family::Channel, Operation::Create;
    ChannelOriginateWithId => "ChannelOriginateWithId", Family::Channel, Operation::Create;
    ChannelData => "ChannelData", Family::Channel, Operation::Get;
    ChannelHangup => "ChannelHangup", Family::Channel, Operation::Delete;
    ChannelContinue => "ChannelContinue", Family::Channel, Operation::Command("continue");
    ChannelMove => "ChannelMove", Family::Channel, Operation::Command("move");
    ChannelRedirect => "ChannelRedirect", Family::Channel, Operation::Command("redirect");
    ChannelAnswer => "ChannelAnswer", Family::Channel, Operation::Command("answer");
    ChannelRing => "ChannelRing", Family::Channel, Operation::Command("ring");
    ChannelStopRing => "ChannelStopRing", Family::Channel, Operation::Command("stopRing");
    ChannelMute => "ChannelMute", Family::Channel, Operation::Command("mute");
    ChannelUnmute => "ChannelUnmute", Family::Channel, Operation::Command("unmute");
    ChannelHold => "ChannelHold", Family::Channel, Operation::Command("hold");
    ChannelUnhold => "ChannelUnhold", Family::Channel, Operation::Command("unhold");
    ChannelStartMoh => "ChannelStartMoh", Family::Channel, Operation::Command("startMoh");
    ChannelStopMoh => "ChannelStopMoh", Family::Channel, Operation::Command("stopMoh");
    ChannelStartSilence => "ChannelStartSilence", Family::Channel, Operation::Command("startSilence");
    ChannelStopSilence => "ChannelStopSilence", Family::Channel, Operation::Command("stopSilence");
    ChannelPlay => "ChannelPlay", Family::Channel, Operation::Command("play");
    ChannelPlayWithId => "ChannelPlayWithId", Family::Channel, Operation::Command("playWithId");
    ChannelRecord => "ChannelRecord", Family::Channel, Operation::Command("record");
    ChannelSnoop => "ChannelSnoop", Family::Channel, Operation::Command("snoop");
    ChannelDial => "ChannelDial", Family::Channel, Operation::Command("dial");

    DeviceStateList => "DeviceStateList", Family::DeviceState, Operation::List;
    DeviceStateData => "DeviceStateData", Family::DeviceState, Operation::Get;
    DeviceStateUpdate => "DeviceStateUpdate", Family::DeviceState, Operation::Command("update");
    DeviceStateDelete => "DeviceStateDelete", Family::DeviceState, Operation::Delete;

    EndpointList => "EndpointList", Family::Endpoint, Operation::List;
    EndpointListByTech => "EndpointListByTech", Family::Endpoint, Operation::List;
    EndpointData => "EndpointData", Family::Endpoint, Operation::Get;
    EndpointRefer => "EndpointRefer", Family::Endpoint, Operation::Command("refer");

    MailboxList => "MailboxList", Family::Mailbox, Operation::List;
    MailboxData => "MailboxData", Family::Mailbox, Operation::Get;
    MailboxUpdate => "MailboxUpdate", Family::Mailbox, Operation::Command("update");
    MailboxDelete => "MailboxDelete", Family::Mailbox, Operation::Delete;

    PlaybackData => "PlaybackData", Family::Playback, Operation::Get;
    // PlaybackStop intentionally routes to the same handler as PlaybackControl: kept
    // as-is per an unresolved upstream ambiguity rather than guessed apart.
    PlaybackStop => "PlaybackStop", Family::Playback, Operation::Command("control");
    PlaybackControl => "PlaybackControl", Family::Playback, Operation::Command("control");

    RecordingLiveData => "RecordingLiveData", Family::RecordingLive, Operation::Get;
    RecordingLiveStop => "RecordingLiveStop", Family::RecordingLive, Operation::Command("stop");
    RecordingLivePause => "RecordingLivePause", Family::RecordingLive, Operation::Command("pause");
    RecordingLiveUnpause => "RecordingLiveUnpause", Family::RecordingLive, Operation::Command("unpause");
    RecordingLiveMute => "RecordingLiveMute", Family::RecordingLive, Operation::Command("mute");
    RecordingLiveUnmute => "RecordingLiveUnmute", Family::RecordingLive, Operation::Command("unmute");
    RecordingLiveDelete => "RecordingLiveDelete", Family::RecordingLive, Operation::Delete;

    RecordingStoredList => "RecordingStoredList", Family::RecordingStored, Operation::List;
    RecordingStoredData => "RecordingStoredData", Family::RecordingStored, Operation::Get;
    RecordingStoredFile => "RecordingStoredFile", Family::RecordingStored, Operation::Command("file");
    RecordingStoredDelete => "RecordingStoredDelete", Family::RecordingStored, Operation::Delete;

    SoundList => "SoundList", Family::Sound, Operation::List;
    SoundData => "SoundData", Family::Sound, Operation::Get;
}

/// Runs the generic engine call a `Kind`'s operation maps to and turns the result into
/// a reply envelope. Every per-family handler module delegates here; the family
/// grouping exists purely for readability (§9), not for distinct per-family logic.
///
/// Races the engine call against `cancel` so shutdown aborts in-flight SDK calls (§5)
/// instead of letting the close group wait on them.
pub async fn execute(
    engine: &dyn Engine,
    family: Family,
    kind: Kind,
    request: &Request,
    mut cancel: watch::Receiver<bool>,
) -> Reply {
    let key = request.key.clone().unwrap_or_default();
    let call = async {
        match kind.operation() {
            Operation::List => engine.list(family.as_str(), &key).await,
            Operation::Get => engine.get(family.as_str(), &key).await,
            Operation::Create => engine.create(family.as_str(), &key, request.payload.clone()).await,
            Operation::Delete => engine.delete(family.as_str(), &key).await,
            Operation::Command(verb) => engine.command(family.as_str(), verb, &key, request.payload.clone()).await,
        }
    };
    tokio::select! {
        result = call => reply_from_result(result),
        _ = cancel.changed() => Reply::error("shutdown in progress, request aborted"),
    }
}

fn reply_from_result(result: Result<Value, EngineError>) -> Reply {
    match result {
        Ok(data) => Reply::ok(data),
        Err(EngineError::NotFound) => Reply::not_found("resource not found"),
        Err(EngineError::Other(message)) => Reply::error(message),
    }
}

/// Decodes the request, resolves it to a handler, and publishes exactly one reply.
/// Unknown kinds never reach a handler — they get an immediate `NotImplemented` reply.
pub async fn dispatch(
    engine: Arc<dyn Engine>,
    bus: Arc<dyn Bus>,
    reply_subject: String,
    request: Request,
    cancel: watch::Receiver<bool>,
) {
    let reply = match Kind::from_str(&request.kind) {
        Ok(kind) => handlers::handle(engine.as_ref(), kind, &request, cancel).await,
        Err(()) => Reply::not_implemented(format!("unknown request kind: {}", request.kind)),
    };
    publish_reply(&bus, &reply_subject, &reply).await;
}

async fn publish_reply(bus: &Arc<dyn Bus>, subject: &str, reply: &Reply) {
    match envelope::encode(reply) {
        Ok(payload) => {
            if let Err(e) = bus.publish(subject, payload).await {
                warn!(error = %e, subject, "failed to publish reply");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode reply"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_its_wire_string() {
        let kinds = [
            Kind::ApplicationList,
            Kind::ChannelData,
            Kind::ChannelHangup,
            Kind::PlaybackStop,
            Kind::PlaybackControl,
            Kind::SoundData,
        ];
        for kind in kinds {
            let wire = kind.to_string();
            assert_eq!(Kind::from_str(&wire), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_does_not_parse() {
        assert!(Kind::from_str("Nonsense").is_err());
    }

    #[test]
    fn playback_stop_and_control_share_a_family_and_operation_verb() {
        assert_eq!(Kind::PlaybackStop.family(), Kind::PlaybackControl.family());
        assert!(matches!(Kind::PlaybackStop.operation(), Operation::Command("control")));
        assert!(matches!(Kind::PlaybackControl.operation(), Operation::Command("control")));
    }
}
