//! Password policy defaults

use serde::{Deserialize, Serialize};

/// Password configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Policy applied to users bound to no policy
    #[serde(default)]
    pub default_policy: Option<String>,
}
