//! Layered configuration: built-in defaults → optional JSON file → CLI/env overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::trace;

use super::cli::CliConfig;
use super::constants::*;

/// Everything a JSON config file may set, all-optional so unset fields fall through to
/// the next layer.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub nats_url: Option<String>,
    pub prefix: Option<String>,
    pub announce_interval_secs: Option<u64>,
    pub shutdown_timeout_ms: Option<u64>,
    pub queue_group: Option<String>,
    pub log: Option<String>,
}

impl FileConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// The fully resolved configuration consumed by the supervisor.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub nats_url: String,
    pub prefix: String,
    pub announce_interval: Duration,
    pub shutdown_timeout: Duration,
    pub queue_group: String,
    pub log_filter: String,
}

impl ProxyConfig {
    pub fn load(cli: &CliConfig) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                trace!(path, "loading config file");
                Some(FileConfig::load_from_file(Path::new(path))?)
            }
            None => None,
        };
        let file = file.unwrap_or_default();

        let nats_url = cli
            .nats_url
            .clone()
            .or(file.nats_url)
            .unwrap_or_else(|| DEFAULT_NATS_URL.to_string());
        let prefix = cli.prefix.clone().or(file.prefix).unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        let announce_interval_secs = cli
            .announce_interval_secs
            .or(file.announce_interval_secs)
            .unwrap_or(DEFAULT_ANNOUNCE_INTERVAL_SECS);
        let shutdown_timeout_ms =
            cli.shutdown_timeout_ms.or(file.shutdown_timeout_ms).unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS);
        let queue_group =
            cli.queue_group.clone().or(file.queue_group).unwrap_or_else(|| DEFAULT_QUEUE_GROUP.to_string());
        let log_filter = cli.log.clone().or(file.log).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            nats_url,
            prefix,
            announce_interval: Duration::from_secs(announce_interval_secs),
            shutdown_timeout: Duration::from_millis(shutdown_timeout_ms),
            queue_group,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ProxyConfig::load(&CliConfig::default()).unwrap();
        assert_eq!(config.prefix, "ari.");
        assert_eq!(config.nats_url, DEFAULT_NATS_URL);
        assert_eq!(config.queue_group, "ariproxy");
        assert_eq!(config.shutdown_timeout, Duration::from_millis(500));
    }

    #[test]
    fn cli_overrides_defaults() {
        let cli = CliConfig { prefix: Some("custom.".into()), ..Default::default() };
        let config = ProxyConfig::load(&cli).unwrap();
        assert_eq!(config.prefix, "custom.");
    }
}
