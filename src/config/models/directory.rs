//! Directory collaborator configuration

use super::*;
use crate::utils::error::RbacError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Directory backend implementation, resolved once at engine construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryBackend {
    /// In-process store
    #[default]
    Memory,
}

impl FromStr for DirectoryBackend {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Self::Memory),
            other => Err(RbacError::config(format!(
                "Unsupported directory backend: {}",
                other
            ))),
        }
    }
}

/// Directory configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Backend used by `RbacEngine::new`
    #[serde(default)]
    pub backend: DirectoryBackend,
    /// Upper bound for every collaborator call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DirectoryConfig {
    /// Collaborator call bound as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
