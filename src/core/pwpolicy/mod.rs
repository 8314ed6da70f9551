//! Password policy enforcement
//!
//! - `state`: authentication transitions (lockout, expiry, grace logins)
//! - `change`: password change rules (age, length, history)
//! - `credentials`: directory-backed operations under the per-user lock
//! - `manager`: policy CRUD and user binding

mod change;
mod credentials;
mod manager;
mod state;

pub(crate) use change::check_new_secret;
pub use change::Initiator;
pub use manager::{PwPolicyManager, validate_policy};
pub use state::{AuthOutcome, PolicyState, lock_expiry, password_state};
