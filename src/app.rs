//! Boot orchestration: CLI/config/logging, then hands off to the supervisor.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::error;

use crate::core::{self, ProxyConfig};
use crate::engine::Engine;
use crate::engine::unavailable::UnavailableEngine;
use crate::supervisor::{Supervisor, SupervisorConfig};

pub struct App;

impl App {
    pub async fn run() -> anyhow::Result<()> {
        let _ = dotenvy::dotenv();

        let cli = core::cli::parse();
        let config = ProxyConfig::load(&cli)?;
        core::logging::init(&config.log_filter);

        Self::run_with_engine(Arc::new(UnavailableEngine), config).await
    }

    /// The part of boot independent of where the engine implementation comes from —
    /// split out so tests can supply a fake engine without going through the CLI.
    pub async fn run_with_engine(engine: Arc<dyn Engine>, config: ProxyConfig) -> anyhow::Result<()> {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        install_signal_handler(cancel_tx);
        let (ready_tx, _ready_rx) = watch::channel(false);

        let supervisor_config = SupervisorConfig {
            prefix: config.prefix,
            announce_interval: config.announce_interval,
            shutdown_timeout: config.shutdown_timeout,
            create_queue_group: config.queue_group,
        };

        if let Err(e) = Supervisor::listen(engine, &config.nats_url, supervisor_config, ready_tx, cancel_rx).await {
            error!(error = %e, "proxy exited with an error");
            return Err(e.into());
        }
        Ok(())
    }
}

fn install_signal_handler(cancel_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = terminate.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }
        let _ = cancel_tx.send(true);
    });
}
