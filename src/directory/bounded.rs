//! Timeout-bounded access to the directory collaborators

use super::{CredentialBinder, DirectoryStore, UserFilter};
use crate::core::models::{
    AdminRole, EdgeOp, Permission, PwPolicy, Role, SdSet, SdType, User,
};
use crate::utils::error::{RbacError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Directory collaborators with every call bounded by a timeout.
///
/// A call exceeding the bound fails with `DirectoryTimeout` and is not
/// retried.
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn DirectoryStore>,
    binder: Arc<dyn CredentialBinder>,
    timeout: Duration,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Directory {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        binder: Arc<dyn CredentialBinder>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            binder,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(op, timeout_ms, "Directory call timed out");
                Err(RbacError::timeout(format!(
                    "{} exceeded {} ms",
                    op, timeout_ms
                )))
            }
        }
    }

    pub async fn bind(&self, context_id: &str, user_id: &str, secret: &str) -> Result<bool> {
        self.bounded("bind", self.binder.bind(context_id, user_id, secret))
            .await
    }

    // Users

    pub async fn read_user(&self, context_id: &str, user_id: &str) -> Result<Option<User>> {
        self.bounded("read_user", self.store.read_user(context_id, user_id))
            .await
    }

    /// Read a user that must exist
    pub async fn require_user(&self, context_id: &str, user_id: &str) -> Result<User> {
        self.read_user(context_id, user_id)
            .await?
            .ok_or_else(|| RbacError::user_not_found(format!("User '{}' not found", user_id)))
    }

    pub async fn write_user(&self, context_id: &str, user: &User) -> Result<()> {
        self.bounded("write_user", self.store.write_user(context_id, user))
            .await
    }

    pub async fn delete_user(&self, context_id: &str, user_id: &str) -> Result<()> {
        self.bounded("delete_user", self.store.delete_user(context_id, user_id))
            .await
    }

    pub async fn search_users(&self, context_id: &str, filter: &UserFilter) -> Result<Vec<User>> {
        self.bounded("search_users", self.store.search_users(context_id, filter))
            .await
    }

    // RBAC roles

    pub async fn read_role(&self, context_id: &str, name: &str) -> Result<Option<Role>> {
        self.bounded("read_role", self.store.read_role(context_id, name))
            .await
    }

    pub async fn require_role(&self, context_id: &str, name: &str) -> Result<Role> {
        self.read_role(context_id, name)
            .await?
            .ok_or_else(|| RbacError::role_not_found(format!("Role '{}' not found", name)))
    }

    pub async fn write_role(&self, context_id: &str, role: &Role) -> Result<()> {
        self.bounded("write_role", self.store.write_role(context_id, role))
            .await
    }

    pub async fn delete_role(&self, context_id: &str, name: &str) -> Result<()> {
        self.bounded("delete_role", self.store.delete_role(context_id, name))
            .await
    }

    pub async fn list_roles(&self, context_id: &str) -> Result<Vec<Role>> {
        self.bounded("list_roles", self.store.list_roles(context_id))
            .await
    }

    pub async fn write_role_edge(
        &self,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()> {
        self.bounded(
            "write_role_edge",
            self.store.write_role_edge(context_id, parent, child, op),
        )
        .await
    }

    // ARBAC roles

    pub async fn read_admin_role(&self, context_id: &str, name: &str) -> Result<Option<AdminRole>> {
        self.bounded("read_admin_role", self.store.read_admin_role(context_id, name))
            .await
    }

    pub async fn require_admin_role(&self, context_id: &str, name: &str) -> Result<AdminRole> {
        self.read_admin_role(context_id, name)
            .await?
            .ok_or_else(|| RbacError::role_not_found(format!("Admin role '{}' not found", name)))
    }

    pub async fn write_admin_role(&self, context_id: &str, role: &AdminRole) -> Result<()> {
        self.bounded("write_admin_role", self.store.write_admin_role(context_id, role))
            .await
    }

    pub async fn delete_admin_role(&self, context_id: &str, name: &str) -> Result<()> {
        self.bounded("delete_admin_role", self.store.delete_admin_role(context_id, name))
            .await
    }

    pub async fn list_admin_roles(&self, context_id: &str) -> Result<Vec<AdminRole>> {
        self.bounded("list_admin_roles", self.store.list_admin_roles(context_id))
            .await
    }

    pub async fn write_admin_role_edge(
        &self,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()> {
        self.bounded(
            "write_admin_role_edge",
            self.store
                .write_admin_role_edge(context_id, parent, child, op),
        )
        .await
    }

    // Permissions

    pub async fn read_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<Option<Permission>> {
        self.bounded(
            "read_permission",
            self.store
                .read_permission(context_id, obj_name, op_name, admin),
        )
        .await
    }

    pub async fn require_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<Permission> {
        self.read_permission(context_id, obj_name, op_name, admin)
            .await?
            .ok_or_else(|| {
                RbacError::permission_not_found(format!(
                    "Permission '{}.{}' not found",
                    obj_name, op_name
                ))
            })
    }

    pub async fn write_permission(&self, context_id: &str, permission: &Permission) -> Result<()> {
        self.bounded(
            "write_permission",
            self.store.write_permission(context_id, permission),
        )
        .await
    }

    pub async fn delete_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<()> {
        self.bounded(
            "delete_permission",
            self.store
                .delete_permission(context_id, obj_name, op_name, admin),
        )
        .await
    }

    pub async fn list_permissions(&self, context_id: &str, admin: bool) -> Result<Vec<Permission>> {
        self.bounded(
            "list_permissions",
            self.store.list_permissions(context_id, admin),
        )
        .await
    }

    // Separation of duty

    pub async fn read_sd_sets(&self, context_id: &str, sd_type: SdType) -> Result<Vec<SdSet>> {
        self.bounded("read_sd_sets", self.store.read_sd_sets(context_id, sd_type))
            .await
    }

    pub async fn read_sd_set(
        &self,
        context_id: &str,
        sd_type: SdType,
        name: &str,
    ) -> Result<Option<SdSet>> {
        self.bounded(
            "read_sd_set",
            self.store.read_sd_set(context_id, sd_type, name),
        )
        .await
    }

    pub async fn require_sd_set(&self, context_id: &str, sd_type: SdType, name: &str) -> Result<SdSet> {
        self.read_sd_set(context_id, sd_type, name)
            .await?
            .ok_or_else(|| {
                RbacError::sd_set_not_found(format!("{} set '{}' not found", sd_type, name))
            })
    }

    pub async fn write_sd_set(&self, context_id: &str, set: &SdSet) -> Result<()> {
        self.bounded("write_sd_set", self.store.write_sd_set(context_id, set))
            .await
    }

    pub async fn delete_sd_set(&self, context_id: &str, sd_type: SdType, name: &str) -> Result<()> {
        self.bounded(
            "delete_sd_set",
            self.store.delete_sd_set(context_id, sd_type, name),
        )
        .await
    }

    // Password policies

    pub async fn read_policy(&self, context_id: &str, name: &str) -> Result<Option<PwPolicy>> {
        self.bounded("read_policy", self.store.read_policy(context_id, name))
            .await
    }

    pub async fn require_policy(&self, context_id: &str, name: &str) -> Result<PwPolicy> {
        self.read_policy(context_id, name)
            .await?
            .ok_or_else(|| RbacError::policy_not_found(format!("Policy '{}' not found", name)))
    }

    pub async fn write_policy(&self, context_id: &str, policy: &PwPolicy) -> Result<()> {
        self.bounded("write_policy", self.store.write_policy(context_id, policy))
            .await
    }

    pub async fn delete_policy(&self, context_id: &str, name: &str) -> Result<()> {
        self.bounded("delete_policy", self.store.delete_policy(context_id, name))
            .await
    }

    pub async fn list_policies(&self, context_id: &str) -> Result<Vec<PwPolicy>> {
        self.bounded("list_policies", self.store.list_policies(context_id))
            .await
    }
}
