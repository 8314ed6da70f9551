//! Configuration data models
//!
//! This module defines all configuration structures used by the engine.

pub mod directory;
pub mod engine;
pub mod hierarchy;
pub mod logging;
pub mod password;
pub mod session;

pub use directory::*;
pub use engine::*;
pub use hierarchy::*;
pub use logging::*;
pub use password::*;
pub use session::*;

/// Default directory call bound in milliseconds
pub fn default_timeout_ms() -> u64 {
    5_000
}

/// Default session idle timeout in seconds
pub fn default_idle_timeout_secs() -> u64 {
    1_800 // 30 minutes
}

/// Default absolute session lifetime in seconds
pub fn default_max_lifetime_secs() -> u64 {
    28_800 // 8 hours
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}

/// Default true value
pub fn default_true() -> bool {
    true
}
