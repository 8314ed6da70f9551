//! Integration tests for rbac-engine
//!
//! These tests drive the public engine API against the in-memory directory
//! and verify behavior across managers.

pub mod config_tests;
pub mod delegated_admin_tests;
pub mod error_handling_tests;
pub mod hierarchy_tests;
pub mod password_policy_tests;
pub mod session_tests;
pub mod sod_tests;
