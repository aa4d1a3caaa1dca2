//! Boots engine and bus connections, establishes all subscriptions, signals readiness,
//! and orchestrates bounded shutdown (§4.G).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::bus::{Bus, envelope, nats::NatsBus};
use crate::close_group::CloseGroup;
use crate::dialog::{DialogManager, InMemoryDialogManager};
use crate::dispatch;
use crate::engine::Engine;
use crate::error::BootError;
use crate::model::{Announcement, Request};
use crate::{announcer, pump, subject};

pub struct SupervisorConfig {
    pub prefix: String,
    pub announce_interval: Duration,
    pub shutdown_timeout: Duration,
    pub create_queue_group: String,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            prefix: "ari.".to_string(),
            announce_interval: Duration::from_secs(10),
            shutdown_timeout: Duration::from_millis(500),
            create_queue_group: "ariproxy".to_string(),
        }
    }
}

pub struct Supervisor {
    engine: Arc<dyn Engine>,
    bus: Arc<dyn Bus>,
    dialogs: Arc<dyn DialogManager>,
    config: SupervisorConfig,
}

impl Supervisor {
    /// Connects both transports, then delegates to `listen_on`.
    pub async fn listen(
        engine: Arc<dyn Engine>,
        bus_url: &str,
        config: SupervisorConfig,
        ready: watch::Sender<bool>,
        cancel: watch::Receiver<bool>,
    ) -> Result<(), BootError> {
        let bus = Arc::new(NatsBus::connect(bus_url).await?);
        Self::listen_on(engine, bus, config, ready, cancel).await
    }

    /// Reuses pre-built engine/bus handles — the entry point tests drive directly.
    ///
    /// `ready` is closed (set to `true`) exactly once, after every subscription below
    /// has been established, so a caller can synchronize on boot completing (§3, §8
    /// property 5) instead of guessing at a delay.
    pub async fn listen_on(
        engine: Arc<dyn Engine>,
        bus: Arc<dyn Bus>,
        config: SupervisorConfig,
        ready: watch::Sender<bool>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<(), BootError> {
        let supervisor = Supervisor { engine, bus, dialogs: Arc::new(InMemoryDialogManager::new()), config };

        let system_info = supervisor.engine.system_info().await.map_err(BootError::SystemInfo)?;
        if system_info.entity_id.is_empty() {
            return Err(BootError::EmptyEntityId);
        }
        let node = system_info.entity_id;
        let application = supervisor.engine.application_name();
        info!(node, application, "engine reports identity");

        let close_group = Arc::new(CloseGroup::new());

        supervisor.subscribe_requests(&node, &application, &close_group, cancel.clone()).await?;

        let events = supervisor
            .engine
            .subscribe_events()
            .await
            .map_err(BootError::EventSubscription)?;
        let pump_handle = tokio::spawn(pump::run(
            events,
            supervisor.bus.clone(),
            supervisor.dialogs.clone(),
            supervisor.config.prefix.clone(),
            application.clone(),
            node.clone(),
            cancel.clone(),
        ));

        let announcement = Announcement { node: node.clone(), application: application.clone() };
        let announcer_handle = tokio::spawn(announcer::run(
            supervisor.bus.clone(),
            supervisor.config.prefix.clone(),
            announcement,
            supervisor.config.announce_interval,
            cancel.clone(),
        ));

        // Readiness is signaled exactly once, after every subscription above exists.
        let _ = ready.send(true);
        info!("all subscriptions established, proxy is ready");

        let _ = cancel.changed().await;
        debug!("shutdown requested, draining");

        let _ = pump_handle.await;
        let _ = announcer_handle.await;

        close_group.close(supervisor.config.shutdown_timeout).await.unwrap_or_else(|timeout| {
            panic!("shutdown did not complete within {:?}: subscriptions may be leaked", timeout.0)
        });

        Ok(())
    }

    async fn subscribe_requests(
        &self,
        node: &str,
        application: &str,
        close_group: &Arc<CloseGroup>,
        cancel: watch::Receiver<bool>,
    ) -> Result<(), BootError> {
        for (subject, queue_group) in subject::boot_subjects(&self.config.prefix, application, node) {
            let queue_group = queue_group.map(|_| self.config.create_queue_group.clone());
            let mut subscription = match &queue_group {
                Some(group) => self.bus.queue_subscribe(&subject, group).await,
                None => self.bus.subscribe(&subject).await,
            }
            .map_err(|e| BootError::Subscription(format!("{subject}: {e}")))?;

            let engine = self.engine.clone();
            let bus = self.bus.clone();
            let subject_for_log = subject.clone();
            let mut cancel = cancel.clone();
            close_group
                .add(async move {
                    loop {
                        let message = tokio::select! {
                            _ = cancel.changed() => break,
                            message = subscription.recv() => message,
                        };
                        let Some(message) = message else { break };
                        let Some(reply_subject) = message.reply.clone() else {
                            debug!(subject = %subject_for_log, "request had no reply subject, dropping");
                            continue;
                        };
                        let request: Request = match envelope::decode(&message.payload) {
                            Ok(request) => request,
                            Err(e) => {
                                debug!(error = %e, "failed to decode request envelope");
                                continue;
                            }
                        };
                        tokio::spawn(dispatch::dispatch(
                            engine.clone(),
                            bus.clone(),
                            reply_subject,
                            request,
                            cancel.clone(),
                        ));
                    }
                    subscription.unsubscribe().await;
                })
                .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::envelope;
    use crate::bus::fake::FakeBus;
    use crate::engine::fake::FakeEngine;
    use crate::model::{Reply, Request};

    #[tokio::test]
    async fn s1_boot_ready_shutdown_subscribes_every_expected_subject() {
        let engine: Arc<dyn Engine> = Arc::new(FakeEngine::new("node-A", "demo"));
        let bus = FakeBus::new();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (ready_tx, mut ready_rx) = watch::channel(false);

        let handle = tokio::spawn(Supervisor::listen_on(
            engine,
            bus.clone() as Arc<dyn Bus>,
            SupervisorConfig::default(),
            ready_tx,
            cancel_rx,
        ));

        ready_rx.changed().await.unwrap();
        cancel_tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_millis(500), handle).await;
        assert!(result.is_ok(), "listen_on did not return within the shutdown bound");
        result.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn s4_unknown_kind_replies_not_implemented_with_no_sdk_call() {
        let engine: Arc<dyn Engine> = Arc::new(FakeEngine::new("node-A", "demo"));
        let bus = FakeBus::new();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let (ready_tx, mut ready_rx) = watch::channel(false);

        let supervisor_bus = bus.clone() as Arc<dyn Bus>;
        let handle = tokio::spawn(Supervisor::listen_on(
            engine,
            supervisor_bus,
            SupervisorConfig::default(),
            ready_tx,
            cancel_rx,
        ));

        ready_rx.changed().await.unwrap();

        let mut reply_sub = bus.subscribe("inbox.reply").await.unwrap();
        let request = Request { kind: "Nonsense".into(), key: None, payload: serde_json::Value::Null };
        let payload = envelope::encode(&request).unwrap();
        bus.publish_with_reply("ari.get.demo.node-A", "inbox.reply", payload).await.unwrap();

        let message = tokio::time::timeout(Duration::from_millis(200), reply_sub.recv()).await.unwrap().unwrap();
        let reply: Reply = envelope::decode(&message.payload).unwrap();
        match reply {
            Reply::Err(e) => assert_eq!(e.kind, "NotImplemented"),
            _ => panic!("expected an error reply"),
        }

        handle.abort();
    }
}
