//! Test suite for rbac-engine
//!
//! ## Test Categories
//!
//! ### 1. Common Utilities (`common/`)
//! Shared test infrastructure including:
//! - An engine over the in-memory directory with a manual clock
//! - Fixtures for the branch-banking role model
//! - Custom assertions on error kinds
//!
//! ### 2. Integration Tests (`integration/`)
//! Tests that drive the public engine API end to end:
//! - Sessions and permission checks
//! - Password policy transitions
//! - Separation of duty and hierarchy edits
//! - Delegated administration
//! - Configuration loading and collaborator failures
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all tests
//! cargo test
//!
//! # Run only unit tests
//! cargo test --lib
//!
//! # Run integration tests
//! cargo test --test lib
//! ```

pub mod common;
pub mod integration;
