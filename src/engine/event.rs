//! Engine event shape and its conversion into the bus-neutral [`RawEvent`].

use serde_json::Value;

use crate::model::{Header, RawEvent};

/// An event as delivered by the engine's event bus subscription.
///
/// `resource_ids` lists every engine resource (channel, bridge, playback, recording,
/// ...) this event references; the event pump unions the dialogs bound to each of them
/// to compute the dialog fan-out (§4.E).
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub body: Value,
    pub resource_ids: Vec<String>,
}

impl EngineEvent {
    pub fn new(body: Value, resource_ids: Vec<String>) -> Self {
        Self { body, resource_ids }
    }

    /// Converts to a raw event, or `None` if the event carries no usable body — the
    /// pump logs and drops such events rather than publishing an empty one.
    pub fn to_raw_event(&self) -> Option<RawEvent> {
        if self.body.is_null() {
            return None;
        }
        Some(RawEvent { header: Header::new(), body: self.body.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_body_converts_to_none() {
        let event = EngineEvent::new(Value::Null, vec![]);
        assert!(event.to_raw_event().is_none());
    }

    #[test]
    fn non_null_body_converts_with_empty_header() {
        let event = EngineEvent::new(serde_json::json!({"type": "ChannelHangup"}), vec!["c1".into()]);
        let raw = event.to_raw_event().unwrap();
        assert_eq!(raw.header.iter().count(), 0);
        assert_eq!(raw.body["type"], "ChannelHangup");
    }
}
