//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::{config::LoggingConfig, Error, Result};

/// Build the filter for `config`.
///
/// # Errors
///
/// Returns `Config` if the filter string has an invalid directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::Config(format!("invalid logging.filter '{}': {e}", config.filter)))
}

/// Install a global fmt subscriber writing to stderr.
///
/// # Errors
///
/// Returns `Config` for a bad filter and `Telemetry` if a global subscriber
/// is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    tracing::debug!(filter = %config.filter, "tracing initialized");
    Ok(())
}
