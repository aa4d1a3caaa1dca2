//! Periodic discovery announcements plus an out-of-band refresh on ping (§4.D).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use crate::bus::{Bus, envelope};
use crate::model::Announcement;
use crate::subject;

/// Runs until `cancel` fires: ticks every `interval`, publishing an announcement, and
/// separately answers pings with an immediate out-of-band announcement. Both loops are
/// driven from the same task since neither carries state beyond the ticker.
pub async fn run(
    bus: Arc<dyn Bus>,
    prefix: String,
    announcement: Announcement,
    interval: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    let announce_subject = subject::announce_subject(&prefix);
    let ping_subject = subject::ping_subject(&prefix);

    let mut ping_sub = match bus.subscribe(&ping_subject).await {
        Ok(sub) => sub,
        Err(e) => {
            warn!(error = %e, "announcer failed to subscribe to ping subject");
            return;
        }
    };

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                publish_announcement(&bus, &announce_subject, &announcement).await;
            }
            message = ping_sub.recv() => {
                if message.is_none() {
                    break;
                }
                publish_announcement(&bus, &announce_subject, &announcement).await;
            }
        }
    }

    ping_sub.unsubscribe().await;
}

async fn publish_announcement(bus: &Arc<dyn Bus>, subject: &str, announcement: &Announcement) {
    match envelope::encode(announcement) {
        Ok(payload) => {
            if let Err(e) = bus.publish(subject, payload).await {
                warn!(error = %e, "failed to publish announcement");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode announcement"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::fake::FakeBus;

    #[tokio::test]
    async fn ping_triggers_an_out_of_band_announcement() {
        let bus = FakeBus::new();
        let mut listener = bus.subscribe("ari.announce").await.unwrap();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let announcement = Announcement { node: "node-A".into(), application: "demo".into() };
        let handle = tokio::spawn(run(
            bus.clone(),
            "ari.".into(),
            announcement,
            Duration::from_secs(3600),
            cancel_rx,
        ));

        // give the announcer a moment to subscribe to ping before we publish one.
        tokio::task::yield_now().await;
        bus.publish("ari.ping", b"".to_vec()).await.unwrap();

        let message =
            tokio::time::timeout(Duration::from_millis(200), listener.recv()).await.unwrap().unwrap();
        let decoded: Announcement = envelope::decode(&message.payload).unwrap();
        assert_eq!(decoded.node, "node-A");

        cancel_tx.send(true).unwrap();
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;
    }

    #[tokio::test]
    async fn ticker_publishes_on_schedule() {
        let bus = FakeBus::new();
        let mut listener = bus.subscribe("ari.announce").await.unwrap();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let announcement = Announcement { node: "node-A".into(), application: "demo".into() };
        let handle =
            tokio::spawn(run(bus.clone(), "ari.".into(), announcement, Duration::from_millis(10), cancel_rx));

        let message = tokio::time::timeout(Duration::from_millis(200), listener.recv()).await.unwrap();
        assert!(message.is_some());

        cancel_tx.send(true).unwrap();
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;
    }
}
