//! Role hierarchy configuration

use serde::{Deserialize, Serialize};

/// Role hierarchy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Re-check SSD for assigned users when an inheritance edge is added
    #[serde(default)]
    pub enforce_ssd_on_inheritance: bool,
}
