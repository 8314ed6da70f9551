//! Authorization engine core
//!
//! Role hierarchies, temporal constraints, separation of duty, password
//! policy, sessions and the administrative and review surfaces built on
//! top of them.

pub mod access;
pub mod admin;
pub mod constraint;
pub mod hierarchy;
pub mod locks;
pub mod models;
pub mod pwpolicy;
pub mod review;
pub mod shared;
pub mod sod;

#[cfg(test)]
pub(crate) mod test_support;
