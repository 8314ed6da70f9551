//! Engine configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::utils::validation::validate_name;
use tracing::{debug, warn};

/// One hour; anything slower is almost certainly a unit mistake
const MAX_DIRECTORY_TIMEOUT_MS: u64 = 3_600_000;

impl Validate for DirectoryConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating directory configuration");

        if self.timeout_ms == 0 {
            return Err("Directory timeout must be greater than 0".to_string());
        }

        if self.timeout_ms > MAX_DIRECTORY_TIMEOUT_MS {
            return Err(format!(
                "Directory timeout should not exceed {} ms",
                MAX_DIRECTORY_TIMEOUT_MS
            ));
        }

        Ok(())
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating session configuration");

        if self.max_lifetime_secs > 0
            && self.idle_timeout_secs > 0
            && self.idle_timeout_secs > self.max_lifetime_secs
        {
            warn!(
                idle = self.idle_timeout_secs,
                lifetime = self.max_lifetime_secs,
                "Idle timeout exceeds session lifetime and will never fire"
            );
        }

        Ok(())
    }
}

impl Validate for PasswordConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating password configuration");

        if let Some(policy) = &self.default_policy {
            validate_name("default policy", policy).map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))?;

        Ok(())
    }
}
