//! In-process directory backend

use super::{CredentialBinder, DirectoryStore, UserFilter};
use crate::core::models::{
    AdminRole, EdgeOp, Permission, PermissionKey, PwPolicy, Role, SdSet, SdType, User,
};
use crate::utils::crypto::verify_password;
use crate::utils::error::{RbacError, Result};
use crate::utils::validation::{normalize, same_name};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
struct Partition {
    users: BTreeMap<String, User>,
    roles: BTreeMap<String, Role>,
    admin_roles: BTreeMap<String, AdminRole>,
    permissions: BTreeMap<PermissionKey, Permission>,
    sd_sets: BTreeMap<(SdType, String), SdSet>,
    policies: BTreeMap<String, PwPolicy>,
}

/// Directory kept in memory, partitioned by context id.
///
/// Used by `DirectoryBackend::Memory` and by tests. `set_offline`,
/// `set_latency` and `fail_writes_after` simulate directory server faults.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    partitions: DashMap<String, Arc<RwLock<Partition>>>,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    write_budget: Mutex<Option<usize>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call with `SystemUnavailable` while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every call
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Let `writes` more writes succeed, then fail every write with
    /// `SystemUnavailable`; `None` lifts the limit
    pub fn fail_writes_after(&self, writes: Option<usize>) {
        *self.write_budget.lock() = writes;
    }

    fn spend_write(&self) -> Result<()> {
        let mut budget = self.write_budget.lock();
        match budget.as_mut() {
            Some(0) => Err(RbacError::unavailable("Directory rejected write")),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn partition(&self, context_id: &str) -> Result<Arc<RwLock<Partition>>> {
        let latency = *self.latency.lock();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RbacError::unavailable("Directory server unreachable"));
        }

        Ok(self
            .partitions
            .entry(context_id.to_string())
            .or_default()
            .clone())
    }
}

fn matches_filter(user: &User, filter: &UserFilter) -> bool {
    if let Some(prefix) = &filter.user_id_prefix {
        if !normalize(&user.user_id).starts_with(&normalize(prefix)) {
            return false;
        }
    }
    if let Some(ou) = &filter.ou {
        if !user.ou.as_deref().is_some_and(|u| same_name(u, ou)) {
            return false;
        }
    }
    if let Some(role) = &filter.role {
        if !user.has_role(role) {
            return false;
        }
    }
    if let Some(role) = &filter.admin_role {
        if !user.has_admin_role(role) {
            return false;
        }
    }
    if let Some(policy) = &filter.pw_policy {
        if !user.pw_policy.as_deref().is_some_and(|p| same_name(p, policy)) {
            return false;
        }
    }
    true
}

fn edit_edge(
    parents: &mut BTreeSet<String>,
    children: &mut BTreeSet<String>,
    parent: &str,
    child: &str,
    op: EdgeOp,
) {
    match op {
        EdgeOp::Add => {
            parents.insert(parent.to_string());
            children.insert(child.to_string());
        }
        EdgeOp::Remove => {
            parents.retain(|p| !same_name(p, parent));
            children.retain(|c| !same_name(c, child));
        }
    }
}

#[async_trait::async_trait]
impl CredentialBinder for InMemoryDirectory {
    async fn bind(&self, context_id: &str, user_id: &str, secret: &str) -> Result<bool> {
        let partition = self.partition(context_id).await?;
        let hash = partition
            .read()
            .users
            .get(&normalize(user_id))
            .and_then(|u| u.password_hash.clone());

        match hash {
            Some(hash) => verify_password(secret, &hash),
            None => {
                debug!(context_id, user_id, "Bind attempted for user without credential");
                Ok(false)
            }
        }
    }
}

#[async_trait::async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn read_user(&self, context_id: &str, user_id: &str) -> Result<Option<User>> {
        let partition = self.partition(context_id).await?;
        let user = partition.read().users.get(&normalize(user_id)).cloned();
        Ok(user)
    }

    async fn write_user(&self, context_id: &str, user: &User) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .users
            .insert(normalize(&user.user_id), user.clone());
        Ok(())
    }

    async fn delete_user(&self, context_id: &str, user_id: &str) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition.write().users.remove(&normalize(user_id));
        Ok(())
    }

    async fn search_users(&self, context_id: &str, filter: &UserFilter) -> Result<Vec<User>> {
        let partition = self.partition(context_id).await?;
        let users = partition
            .read()
            .users
            .values()
            .filter(|u| matches_filter(u, filter))
            .cloned()
            .collect();
        Ok(users)
    }

    async fn read_role(&self, context_id: &str, name: &str) -> Result<Option<Role>> {
        let partition = self.partition(context_id).await?;
        let role = partition.read().roles.get(&normalize(name)).cloned();
        Ok(role)
    }

    async fn write_role(&self, context_id: &str, role: &Role) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .roles
            .insert(normalize(&role.name), role.clone());
        Ok(())
    }

    async fn delete_role(&self, context_id: &str, name: &str) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition.write().roles.remove(&normalize(name));
        Ok(())
    }

    async fn list_roles(&self, context_id: &str) -> Result<Vec<Role>> {
        let partition = self.partition(context_id).await?;
        let roles = partition.read().roles.values().cloned().collect();
        Ok(roles)
    }

    async fn write_role_edge(
        &self,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        let mut guard = partition.write();
        let (parent_key, child_key) = (normalize(parent), normalize(child));
        if !guard.roles.contains_key(&parent_key) {
            return Err(RbacError::role_not_found(format!("Role '{}' not found", parent)));
        }
        let mut child_role = guard
            .roles
            .remove(&child_key)
            .ok_or_else(|| RbacError::role_not_found(format!("Role '{}' not found", child)))?;
        let parent_role = guard
            .roles
            .get_mut(&parent_key)
            .ok_or_else(|| RbacError::role_not_found(format!("Role '{}' not found", parent)))?;

        let (parent_name, child_name) = (parent_role.name.clone(), child_role.name.clone());
        edit_edge(
            &mut child_role.parents,
            &mut parent_role.children,
            &parent_name,
            &child_name,
            op,
        );
        guard.roles.insert(child_key, child_role);
        Ok(())
    }

    async fn read_admin_role(&self, context_id: &str, name: &str) -> Result<Option<AdminRole>> {
        let partition = self.partition(context_id).await?;
        let role = partition.read().admin_roles.get(&normalize(name)).cloned();
        Ok(role)
    }

    async fn write_admin_role(&self, context_id: &str, role: &AdminRole) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .admin_roles
            .insert(normalize(&role.name), role.clone());
        Ok(())
    }

    async fn delete_admin_role(&self, context_id: &str, name: &str) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition.write().admin_roles.remove(&normalize(name));
        Ok(())
    }

    async fn list_admin_roles(&self, context_id: &str) -> Result<Vec<AdminRole>> {
        let partition = self.partition(context_id).await?;
        let roles = partition.read().admin_roles.values().cloned().collect();
        Ok(roles)
    }

    async fn write_admin_role_edge(
        &self,
        context_id: &str,
        parent: &str,
        child: &str,
        op: EdgeOp,
    ) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        let mut guard = partition.write();
        let (parent_key, child_key) = (normalize(parent), normalize(child));
        if !guard.admin_roles.contains_key(&parent_key) {
            return Err(RbacError::role_not_found(format!(
                "Admin role '{}' not found",
                parent
            )));
        }
        let mut child_role = guard.admin_roles.remove(&child_key).ok_or_else(|| {
            RbacError::role_not_found(format!("Admin role '{}' not found", child))
        })?;
        let parent_role = guard.admin_roles.get_mut(&parent_key).ok_or_else(|| {
            RbacError::role_not_found(format!("Admin role '{}' not found", parent))
        })?;

        let (parent_name, child_name) = (parent_role.name.clone(), child_role.name.clone());
        edit_edge(
            &mut child_role.parents,
            &mut parent_role.children,
            &parent_name,
            &child_name,
            op,
        );
        guard.admin_roles.insert(child_key, child_role);
        Ok(())
    }

    async fn read_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<Option<Permission>> {
        let partition = self.partition(context_id).await?;
        let key = PermissionKey::new(obj_name, op_name, admin);
        let permission = partition.read().permissions.get(&key).cloned();
        Ok(permission)
    }

    async fn write_permission(&self, context_id: &str, permission: &Permission) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .permissions
            .insert(permission.key(), permission.clone());
        Ok(())
    }

    async fn delete_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        admin: bool,
    ) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        let key = PermissionKey::new(obj_name, op_name, admin);
        partition.write().permissions.remove(&key);
        Ok(())
    }

    async fn list_permissions(&self, context_id: &str, admin: bool) -> Result<Vec<Permission>> {
        let partition = self.partition(context_id).await?;
        let permissions = partition
            .read()
            .permissions
            .values()
            .filter(|p| p.admin == admin)
            .cloned()
            .collect();
        Ok(permissions)
    }

    async fn read_sd_sets(&self, context_id: &str, sd_type: SdType) -> Result<Vec<SdSet>> {
        let partition = self.partition(context_id).await?;
        let sets = partition
            .read()
            .sd_sets
            .values()
            .filter(|s| s.sd_type == sd_type)
            .cloned()
            .collect();
        Ok(sets)
    }

    async fn read_sd_set(
        &self,
        context_id: &str,
        sd_type: SdType,
        name: &str,
    ) -> Result<Option<SdSet>> {
        let partition = self.partition(context_id).await?;
        let set = partition
            .read()
            .sd_sets
            .get(&(sd_type, normalize(name)))
            .cloned();
        Ok(set)
    }

    async fn write_sd_set(&self, context_id: &str, set: &SdSet) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .sd_sets
            .insert((set.sd_type, normalize(&set.name)), set.clone());
        Ok(())
    }

    async fn delete_sd_set(&self, context_id: &str, sd_type: SdType, name: &str) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .sd_sets
            .remove(&(sd_type, normalize(name)));
        Ok(())
    }

    async fn read_policy(&self, context_id: &str, name: &str) -> Result<Option<PwPolicy>> {
        let partition = self.partition(context_id).await?;
        let policy = partition.read().policies.get(&normalize(name)).cloned();
        Ok(policy)
    }

    async fn write_policy(&self, context_id: &str, policy: &PwPolicy) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        partition
            .write()
            .policies
            .insert(normalize(&policy.name), policy.clone());
        Ok(())
    }

    async fn delete_policy(&self, context_id: &str, name: &str) -> Result<()> {
        let partition = self.partition(context_id).await?;
        self.spend_write()?;
        let mut guard = partition.write();
        guard.policies.remove(&normalize(name));
        for user in guard.users.values_mut() {
            if user.pw_policy.as_deref().is_some_and(|p| same_name(p, name)) {
                user.pw_policy = None;
            }
        }
        Ok(())
    }

    async fn list_policies(&self, context_id: &str) -> Result<Vec<PwPolicy>> {
        let partition = self.partition(context_id).await?;
        let policies = partition.read().policies.values().cloned().collect();
        Ok(policies)
    }
}
