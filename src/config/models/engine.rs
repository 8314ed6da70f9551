//! Top-level engine configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main configuration struct for the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory collaborator selection and call bounds
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Session timer defaults
    #[serde(default)]
    pub session: SessionConfig,
    /// Password policy defaults
    #[serde(default)]
    pub password: PasswordConfig,
    /// Role hierarchy behaviour
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}
