//! Command-line flags, each with an environment-variable fallback.

use clap::Parser;

use super::constants::*;

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about = "Proxy bridging a telephony engine onto a pub/sub bus", long_about = None)]
pub struct Cli {
    #[arg(long, env = ENV_NATS_URL)]
    pub nats_url: Option<String>,

    #[arg(long, env = ENV_PREFIX)]
    pub prefix: Option<String>,

    #[arg(long, env = ENV_CONFIG)]
    pub config: Option<String>,

    #[arg(long, env = ENV_ANNOUNCE_INTERVAL_SECS)]
    pub announce_interval_secs: Option<u64>,

    #[arg(long, env = ENV_SHUTDOWN_TIMEOUT_MS)]
    pub shutdown_timeout_ms: Option<u64>,

    #[arg(long, env = ENV_QUEUE_GROUP)]
    pub queue_group: Option<String>,

    #[arg(long, env = ENV_LOG)]
    pub log: Option<String>,
}

/// Plain-data mirror of [`Cli`], decoupling the rest of the app from clap's types.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub nats_url: Option<String>,
    pub prefix: Option<String>,
    pub config: Option<String>,
    pub announce_interval_secs: Option<u64>,
    pub shutdown_timeout_ms: Option<u64>,
    pub queue_group: Option<String>,
    pub log: Option<String>,
}

pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        nats_url: cli.nats_url,
        prefix: cli.prefix,
        config: cli.config,
        announce_interval_secs: cli.announce_interval_secs,
        shutdown_timeout_ms: cli.shutdown_timeout_ms,
        queue_group: cli.queue_group,
        log: cli.log,
    }
}
