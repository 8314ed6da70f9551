//! # rbac-engine
//!
//! A Role-Based and Administrative Role-Based Access Control (RBAC/ARBAC)
//! authorization engine over a pluggable directory store.
//!
//! ## Features
//!
//! - **Role Hierarchies**: Separate RBAC and ARBAC inheritance graphs with cycle detection
//! - **Temporal Constraints**: Date, lock-date, day-of-week, time-of-day and timeout limits
//! - **Separation of Duty**: Static (assignment) and dynamic (activation) role sets
//! - **Password Policy**: Lockout, expiry, grace logins, history, must-change and safe-modify
//! - **Sessions**: Caller-owned sessions with lazy expiry and inherited permission checks
//! - **Delegated Administration**: OU pools and role ranges for administrative roles
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rbac_engine::{EngineConfig, RbacEngine, SessionRequest};
//! use rbac_engine::core::models::{Permission, Role, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RbacEngine::new(EngineConfig::default())?;
//!     let admin = engine.admin();
//!
//!     admin.add_role("acme", Role::new("BranchStaff")).await?;
//!     admin.add_role("acme", Role::new("Teller")).await?;
//!     admin.add_inheritance("acme", "BranchStaff", "Teller").await?;
//!     admin.add_permission("acme", Permission::new("Account", "read")).await?;
//!     admin.grant_permission("acme", "Account", "read", "BranchStaff").await?;
//!     admin.add_user("acme", User::new("ursula"), Some("Correct-Horse-1")).await?;
//!     admin.assign_user("acme", "ursula", "Teller", None).await?;
//!
//!     let session = engine
//!         .create_session("acme", SessionRequest::new("ursula", "Correct-Horse-1"))
//!         .await?;
//!     assert!(engine.check_access(&session, "Account", "read").await?);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod directory;
pub mod engine;
pub mod utils;

// Re-export main types
pub use config::EngineConfig;
pub use core::access::{AccessManager, DelegatedAccessManager, SessionRequest};
pub use core::admin::{AdminManager, AdminRoleUpdate, RoleUpdate, UserUpdate};
pub use core::pwpolicy::{PolicyState, PwPolicyManager};
pub use core::review::ReviewManager;
pub use engine::RbacEngine;
pub use utils::clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use utils::error::{ErrorKind, RbacError, Result};
pub use utils::logging::init_tracing;

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
