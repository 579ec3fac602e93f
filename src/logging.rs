//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Events go to stderr so stdout stays free for tables and JSON.
//! Level precedence: explicit `--log-level`, then `RUST_LOG`, then `info`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => Ok(EnvFilter::try_new(level)?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
