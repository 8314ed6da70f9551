//! Logging setup and audit events
//!
//! Engine code logs through `tracing` macros directly. This module installs
//! the subscriber for hosts that do not bring their own and provides the
//! security audit logger.

mod security_logger;
mod subscriber;

pub use security_logger::SecurityLogger;
pub use subscriber::init_tracing;
