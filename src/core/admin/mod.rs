//! Administrative mutations of the RBAC and ARBAC data model
//!
//! Every mutation validates its input and runs the relevant invariant
//! check (uniqueness, cycle detection, static separation of duty) before
//! anything is written, so a rejected operation leaves no partial state.
//!
//! - `manager`: users, roles, permissions and role assignment
//! - `inheritance`: hierarchy edits on both graphs
//! - `sd_sets`: separation-of-duty sets
//! - `arbac`: administrative roles

mod arbac;
mod inheritance;
mod manager;
mod sd_sets;

pub use arbac::AdminRoleUpdate;
pub use manager::{AdminManager, RoleUpdate, UserUpdate};
