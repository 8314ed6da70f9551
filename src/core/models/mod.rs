//! Data model for users, roles, permissions, separation-of-duty sets,
//! password policies and sessions

pub mod admin_role;
pub mod constraint;
pub mod permission;
pub mod policy;
pub mod role;
pub mod sdset;
pub mod session;
pub mod user;

pub use admin_role::*;
pub use constraint::*;
pub use permission::*;
pub use policy::*;
pub use role::*;
pub use sdset::*;
pub use session::*;
pub use user::*;
