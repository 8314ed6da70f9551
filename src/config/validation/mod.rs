//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `engine_validators`: validators for each engine config section
//! - `tests`: Test suite for all validators

mod engine_validators;
mod trait_def;

pub use trait_def::Validate;
