//! Drains engine events, annotates them, and fans them out to the canonical subject and
//! every bound dialog subject (§4.E).

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::bus::Bus;
use crate::dialog::DialogManager;
use crate::engine::EventSubscription;
use crate::model::RawEvent;
use crate::subject;

pub async fn run(
    mut events: Box<dyn EventSubscription>,
    bus: Arc<dyn Bus>,
    dialogs: Arc<dyn DialogManager>,
    prefix: String,
    application: String,
    node: String,
    mut cancel: watch::Receiver<bool>,
) {
    let canonical_subject = subject::canonical_event_subject(&prefix, &application, &node);

    loop {
        let event = tokio::select! {
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    break;
                }
                continue;
            }
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let Some(mut raw) = event.to_raw_event() else {
            debug!("dropping engine event: empty conversion");
            continue;
        };
        raw.header.set("application", &application);
        raw.header.set("asterisk", &node);

        publish(&bus, &canonical_subject, &raw).await;

        let mut dialog_ids = std::collections::HashSet::new();
        for resource_id in &event.resource_ids {
            dialog_ids.extend(dialogs.list(resource_id));
        }
        for dialog_id in dialog_ids {
            let mut dialog_raw = raw.clone();
            dialog_raw.header.set("dialog", &dialog_id);
            let dialog_subject = subject::dialog_event_subject(&prefix, &dialog_id);
            publish(&bus, &dialog_subject, &dialog_raw).await;
        }
    }

    events.cancel();
}

async fn publish(bus: &Arc<dyn Bus>, subject: &str, raw: &RawEvent) {
    match serde_json::to_vec(raw) {
        Ok(payload) => {
            if let Err(e) = bus.publish(subject, payload).await {
                warn!(error = %e, subject, "failed to publish event");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode raw event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::fake::FakeBus;
    use crate::dialog::InMemoryDialogManager;
    use crate::engine::EngineEvent;
    use crate::engine::fake::FakeEngine;
    use crate::engine::Engine;

    #[tokio::test]
    async fn canonical_publish_precedes_dialog_publish() {
        let bus = FakeBus::new();
        let engine = Arc::new(FakeEngine::new("node-A", "demo"));
        let dialogs: Arc<dyn DialogManager> = Arc::new(InMemoryDialogManager::new());
        dialogs.bind("d1", "c1");

        let mut canonical_sub = bus.subscribe("ari.event.demo.node-A").await.unwrap();
        let mut dialog_sub = bus.subscribe("ari.dialogevent.d1").await.unwrap();

        let events = engine.subscribe_events().await.unwrap();
        let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
        let pump = tokio::spawn(run(
            events,
            bus.clone(),
            dialogs.clone(),
            "ari.".into(),
            "demo".into(),
            "node-A".into(),
            cancel_rx,
        ));

        engine.emit(EngineEvent::new(serde_json::json!({"type": "ChannelHangup"}), vec!["c1".into()]));

        let canonical = tokio::time::timeout(std::time::Duration::from_millis(200), canonical_sub.recv())
            .await
            .unwrap()
            .unwrap();
        let dialog = tokio::time::timeout(std::time::Duration::from_millis(200), dialog_sub.recv())
            .await
            .unwrap()
            .unwrap();

        let canonical_raw: RawEvent = serde_json::from_slice(&canonical.payload).unwrap();
        assert_eq!(canonical_raw.header.get("application"), Some("demo"));
        let dialog_raw: RawEvent = serde_json::from_slice(&dialog.payload).unwrap();
        assert_eq!(dialog_raw.header.get("dialog"), Some("d1"));

        pump.abort();
    }

    #[tokio::test]
    async fn unbound_dialog_receives_no_publish() {
        let bus = FakeBus::new();
        let engine = Arc::new(FakeEngine::new("node-A", "demo"));
        let dialogs: Arc<dyn DialogManager> = Arc::new(InMemoryDialogManager::new());
        dialogs.bind("d1", "c1");
        dialogs.unbind("d1", "c1");

        let mut dialog_sub = bus.subscribe("ari.dialogevent.d1").await.unwrap();
        let events = engine.subscribe_events().await.unwrap();
        let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
        let pump = tokio::spawn(run(
            events,
            bus.clone(),
            dialogs.clone(),
            "ari.".into(),
            "demo".into(),
            "node-A".into(),
            cancel_rx,
        ));

        engine.emit(EngineEvent::new(serde_json::json!({"type": "ChannelHangup"}), vec!["c1".into()]));

        let result =
            tokio::time::timeout(std::time::Duration::from_millis(50), dialog_sub.recv()).await;
        assert!(result.is_err());

        pump.abort();
    }
}
