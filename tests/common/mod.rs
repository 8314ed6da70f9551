//! Common test utilities for rbac-engine
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{TestEngine, fixtures::CTX};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let env = TestEngine::bank().await;
//!     let session = env.login("ursula").await.unwrap();
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::ResultAssertions;
pub use fixtures::TestEngine;
