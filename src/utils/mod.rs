//! Utility modules shared by the engine

pub mod clock;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod validation;
