//! Sessions and permission checks
//!
//! [`AccessManager`] authenticates users into sessions, gates role
//! activation by temporal constraints and dynamic separation of duty, and
//! answers permission checks over the ascendant closure of the activated
//! roles. [`DelegatedAccessManager`] answers the ARBAC questions for
//! administrative sessions.

mod activation;
mod delegated;
mod manager;

pub use delegated::DelegatedAccessManager;
pub use manager::{AccessManager, SessionRequest};
