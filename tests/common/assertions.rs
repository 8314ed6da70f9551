//! Custom test assertions
//!
//! Provides assertions on the stable error kinds hosts branch on.

use rbac_engine::{ErrorKind, RbacError};
use std::fmt::Debug;

/// Assertions for engine results
pub trait ResultAssertions<T> {
    /// Assert the result failed with `kind` and return the error
    fn assert_kind(self, kind: ErrorKind) -> RbacError;
}

impl<T: Debug> ResultAssertions<T> for Result<T, RbacError> {
    fn assert_kind(self, kind: ErrorKind) -> RbacError {
        match self {
            Ok(value) => panic!("Expected {} error, got Ok({:?})", kind.as_str(), value),
            Err(err) => {
                assert_eq!(
                    err.kind(),
                    kind,
                    "Expected {} error, got {}: {}",
                    kind.as_str(),
                    err.kind().as_str(),
                    err
                );
                err
            }
        }
    }
}
