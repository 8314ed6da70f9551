//! Conversions from library errors

use super::types::RbacError;

impl From<serde_yaml::Error> for RbacError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(format!("YAML error: {}", err))
    }
}

impl From<serde_json::Error> for RbacError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for RbacError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(format!("IO error: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for RbacError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::DirectoryTimeout(err.to_string())
    }
}
