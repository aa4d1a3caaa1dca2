pub mod cli;
pub mod config;
pub mod constants;
pub mod logging;

pub use cli::CliConfig;
pub use config::ProxyConfig;
