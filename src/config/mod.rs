//! Configuration management for the engine
//!
//! This module handles loading, validation, and access to engine configuration.
//! Configuration can come from a YAML file or from `RBAC_*` environment
//! variables (a `.env` file is honoured).

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{RbacError, Result};
use std::path::Path;
use tracing::{debug, info};

impl EngineConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RbacError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)
            .map_err(|e| RbacError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a key lookup, starting from defaults.
    ///
    /// Recognised keys: `RBAC_DIRECTORY_BACKEND`, `RBAC_DIRECTORY_TIMEOUT_MS`,
    /// `RBAC_SESSION_IDLE_TIMEOUT_SECS`, `RBAC_SESSION_MAX_LIFETIME_SECS`,
    /// `RBAC_DEFAULT_PASSWORD_POLICY`, `RBAC_ENFORCE_SSD_ON_INHERITANCE`,
    /// `RBAC_LOG_LEVEL`, `RBAC_LOG_JSON`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(backend) = lookup("RBAC_DIRECTORY_BACKEND") {
            config.directory.backend = backend.parse()?;
        }
        if let Some(value) = lookup("RBAC_DIRECTORY_TIMEOUT_MS") {
            config.directory.timeout_ms = parse_var("RBAC_DIRECTORY_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("RBAC_SESSION_IDLE_TIMEOUT_SECS") {
            config.session.idle_timeout_secs =
                parse_var("RBAC_SESSION_IDLE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("RBAC_SESSION_MAX_LIFETIME_SECS") {
            config.session.max_lifetime_secs =
                parse_var("RBAC_SESSION_MAX_LIFETIME_SECS", &value)?;
        }
        if let Some(value) = lookup("RBAC_DEFAULT_PASSWORD_POLICY") {
            let value = value.trim();
            config.password.default_policy = (!value.is_empty()).then(|| value.to_string());
        }
        if let Some(value) = lookup("RBAC_ENFORCE_SSD_ON_INHERITANCE") {
            config.hierarchy.enforce_ssd_on_inheritance =
                parse_var("RBAC_ENFORCE_SSD_ON_INHERITANCE", &value)?;
        }
        if let Some(value) = lookup("RBAC_LOG_LEVEL") {
            config.logging.level = value;
        }
        if let Some(value) = lookup("RBAC_LOG_JSON") {
            config.logging.json = parse_var("RBAC_LOG_JSON", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.directory
            .validate()
            .map_err(|e| RbacError::Config(format!("Directory config error: {}", e)))?;

        self.session
            .validate()
            .map_err(|e| RbacError::Config(format!("Session config error: {}", e)))?;

        self.password
            .validate()
            .map_err(|e| RbacError::Config(format!("Password config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| RbacError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| RbacError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RbacError::Config(format!("Invalid value for {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
directory:
  backend: memory
  timeout_ms: 750

session:
  idle_timeout_secs: 600
  max_lifetime_secs: 3600

password:
  default_policy: "corporate"

hierarchy:
  enforce_ssd_on_inheritance: true

logging:
  level: "debug"
  json: true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = EngineConfig::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.directory.backend, DirectoryBackend::Memory);
        assert_eq!(config.directory.timeout_ms, 750);
        assert_eq!(config.session.idle_timeout_secs, 600);
        assert_eq!(config.session.max_lifetime_secs, 3600);
        assert_eq!(config.password.default_policy.as_deref(), Some("corporate"));
        assert!(config.hierarchy.enforce_ssd_on_inheritance);
        assert!(config.logging.json);
    }

    #[tokio::test]
    async fn test_config_from_missing_file() {
        let result = EngineConfig::from_file("/nonexistent/rbac-engine.yaml").await;
        assert!(matches!(result, Err(RbacError::Config(_))));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = EngineConfig::from_yaml("session:\n  idle_timeout_secs: 60\n").unwrap();
        assert_eq!(config.session.idle_timeout_secs, 60);
        assert_eq!(config.directory, DirectoryConfig::default());
        assert!(!config.hierarchy.enforce_ssd_on_inheritance);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = EngineConfig::from_yaml("directory:\n  backend: ldap-over-carrier-pigeon\n");
        assert!(matches!(result, Err(RbacError::Config(_))));

        let result = EngineConfig::from_yaml("directory:\n  timeout_ms: 0\n");
        assert!(matches!(result, Err(RbacError::Config(_))));
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("RBAC_DIRECTORY_TIMEOUT_MS", "250"),
            ("RBAC_SESSION_IDLE_TIMEOUT_SECS", "120"),
            ("RBAC_DEFAULT_PASSWORD_POLICY", "strict"),
            ("RBAC_ENFORCE_SSD_ON_INHERITANCE", "true"),
            ("RBAC_LOG_JSON", "false"),
        ]
        .into_iter()
        .collect();

        let config =
            EngineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.directory.timeout_ms, 250);
        assert_eq!(config.session.idle_timeout_secs, 120);
        assert_eq!(config.password.default_policy.as_deref(), Some("strict"));
        assert!(config.hierarchy.enforce_ssd_on_inheritance);
    }

    #[test]
    fn test_config_from_lookup_rejects_garbage() {
        let result = EngineConfig::from_lookup(|key| {
            (key == "RBAC_DIRECTORY_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(RbacError::Config(_))));
    }

    #[test]
    fn test_config_serialization() {
        let yaml = EngineConfig::default().to_yaml().unwrap();
        let reparsed = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(reparsed, EngineConfig::default());
    }
}
