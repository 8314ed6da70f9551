//! Tracing subscriber installation

use crate::config::LoggingConfig;
use crate::utils::error::{RbacError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber configured from [`LoggingConfig`].
///
/// `RUST_LOG` takes precedence over the configured level. Returns `Ok(false)`
/// when a global subscriber was already installed by the host.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| RbacError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    Ok(installed)
}
