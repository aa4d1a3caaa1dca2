//! App-identity, env-var, and default constants.

// ==== App identity ====
pub const APP_NAME: &str = "ariproxy";

// ==== Env vars ====
pub const ENV_NATS_URL: &str = "ARIPROXY_NATS_URL";
pub const ENV_PREFIX: &str = "ARIPROXY_PREFIX";
pub const ENV_CONFIG: &str = "ARIPROXY_CONFIG";
pub const ENV_ANNOUNCE_INTERVAL_SECS: &str = "ARIPROXY_ANNOUNCE_INTERVAL_SECS";
pub const ENV_SHUTDOWN_TIMEOUT_MS: &str = "ARIPROXY_SHUTDOWN_TIMEOUT_MS";
pub const ENV_QUEUE_GROUP: &str = "ARIPROXY_QUEUE_GROUP";
pub const ENV_LOG: &str = "ARIPROXY_LOG";

// ==== Defaults ====
pub const DEFAULT_NATS_URL: &str = "nats://127.0.0.1:4222";
pub const DEFAULT_PREFIX: &str = "ari.";
pub const DEFAULT_ANNOUNCE_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_QUEUE_GROUP: &str = "ariproxy";
pub const DEFAULT_LOG_FILTER: &str = "info,ariproxy=debug";
