//! Directory collaborators
//!
//! The engine keeps no state of record: users, roles, permissions, SD sets
//! and policies live behind [`DirectoryStore`], and credential checks go
//! through [`CredentialBinder`]. Every lookup is scoped by a context id.
//! [`Directory`] wraps both with the configured call bound.

mod bounded;
mod memory;

pub use bounded::Directory;
pub use memory::InMemoryDirectory;

use crate::core::models::{
    AdminRole, EdgeOp, Permission, PwPolicy, Role, SdSet, SdType, User,
};
use crate::utils::error::Result;

/// Credential verification
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialBinder: Send + Sync {
    /// Verify `secret` for `user_id`; `Ok(false)` means wrong credential
    async fn bind(&self, context_id: &str, user_id: &str, secret: &str) -> Result<bool>;
}

/// Search criteria for users; all present criteria must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Case-insensitive user id prefix
    pub user_id_prefix: Option<String>,
    pub ou: Option<String>,
    /// Assigned RBAC role
    pub role: Option<String>,
    /// Assigned ARBAC role
    pub admin_role: Option<String>,
    /// Bound password policy
    pub pw_policy: Option<String>,
}

impl UserFilter {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    pub fn with_admin_role(role: impl Into<String>) -> Self {
        Self {
            admin_role: Some(role.into()),
            ..Self::default()
        }
    }

    pub fn with_policy(policy: impl Into<String>) -> Self {
        Self {
            pw_policy: Some(policy.into()),
            ..Self::default()
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            user_id_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }
}

/// Persistence for every entity the engine manages.
///
/// Names are matched case-insensitively. Reads of missing entries return
/// `Ok(None)`; I/O failures are `SystemUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn read_user(&self, context_id: &str, user_id: &str) -> Result<Option<User>>;
    /// Insert or replace
    async fn write_user(&self, context_id: &str, user: &User) -> Result<()>;
    async fn delete_user(&self, context_id: &str, user_id: &str) -> Result<()>;
    async fn search_users(&self, context_id: &str, filter: &UserFilter) -> Result<Vec<User>>;

    async fn read_role(&self, context_id: &str, name: &str) -> Result<Option<Role>>;
    async fn write_role(&self, context_id: &str, role: &Role) -> Result<()>;
    async fn delete_role(&self, context_id: &str, name: &str) -> Result<()>;
    async fn list_roles(&self, context_id: &str) -> Result<Vec<Role>>;
    /// Add or remove `parent` in `child`'s parents and `child` in `parent`'s children
    async fn write_role_edge(
        &self,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()>;

    async fn read_admin_role(&self, context_id: &str, name: &str) -> Result<Option<AdminRole>>;
    async fn write_admin_role(&self, context_id: &str, role: &AdminRole) -> Result<()>;
    async fn delete_admin_role(&self, context_id: &str, name: &str) -> Result<()>;
    async fn list_admin_roles(&self, context_id: &str) -> Result<Vec<AdminRole>>;
    async fn write_admin_role_edge(
        &self,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()>;

    async fn read_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<Option<Permission>>;
    async fn write_permission(&self, context_id: &str, permission: &Permission) -> Result<()>;
    async fn delete_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<()>;
    async fn list_permissions(&self, context_id: &str, admin: bool) -> Result<Vec<Permission>>;

    async fn read_sd_sets(&self, context_id: &str, sd_type: SdType) -> Result<Vec<SdSet>>;
    async fn read_sd_set(
        &self,
        context_id: &str,
        sd_type: SdType,
        name: &str,
    ) -> Result<Option<SdSet>>;
    async fn write_sd_set(&self, context_id: &str, set: &SdSet) -> Result<()>;
    async fn delete_sd_set(&self, context_id: &str, sd_type: SdType, name: &str) -> Result<()>;

    async fn read_policy(&self, context_id: &str, name: &str) -> Result<Option<PwPolicy>>;
    async fn write_policy(&self, context_id: &str, policy: &PwPolicy) -> Result<()>;
    /// Delete the policy and clear it from every bound user
    async fn delete_policy(&self, context_id: &str, name: &str) -> Result<()>;
    async fn list_policies(&self, context_id: &str) -> Result<Vec<PwPolicy>>;
}
