//! Validation trait definition
//!
//! Every configuration section implements this trait; `EngineConfig::validate`
//! wraps failures into `RbacError::Config`.

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
