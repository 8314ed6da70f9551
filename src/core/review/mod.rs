//! Read-only review queries over the RBAC data model
//!
//! Queries ignore temporal constraints: they describe what the data model
//! grants, not what a session could activate right now.


use crate::core::models::{Permission, Role, SdSet, SdType, User, UserRole};
use crate::core::shared::EngineCore;
use crate::directory::UserFilter;
use crate::utils::error::Result;
use crate::utils::validation::normalize;
use std::collections::{BTreeSet, HashSet};

fn strip_credentials(mut user: User) -> User {
    user.password_hash = None;
    user.auth_state.history.clear();
    user
}

/// Review queries for users, roles, permissions and SD sets
#[derive(Clone, Debug)]
pub struct ReviewManager {
    core: EngineCore,
}

impl ReviewManager {
    pub(crate) fn new(core: EngineCore) -> Self {
        Self { core }
    }

    /// Roles assigned directly to the user
    pub async fn assigned_roles(&self, context_id: &str, user_id: &str) -> Result<Vec<UserRole>> {
        let user = self.core.directory.require_user(context_id, user_id).await?;
        Ok(user.roles)
    }

    /// Users assigned directly to the role
    pub async fn assigned_users(&self, context_id: &str, role: &str) -> Result<Vec<String>> {
        let directory = &self.core.directory;
        let role = directory.require_role(context_id, role).await?;
        let users = directory
            .search_users(context_id, &UserFilter::with_role(&role.name))
            .await?;
        Ok(users.into_iter().map(|u| u.user_id).collect())
    }

    /// Users assigned to the role or to any role that inherits from it
    pub async fn authorized_users(&self, context_id: &str, role: &str) -> Result<Vec<String>> {
        let directory = &self.core.directory;
        let below = self
            .core
            .roles
            .read(directory, context_id, |graph| graph.descendant_keys(role))
            .await??;

        let users = directory
            .search_users(context_id, &UserFilter::default())
            .await?;
        Ok(users
            .into_iter()
            .filter(|u| u.roles.iter().any(|r| below.contains(&normalize(&r.name))))
            .map(|u| u.user_id)
            .collect())
    }

    /// Permissions granted to the role, optionally including those it inherits
    pub async fn role_permissions(&self, context_id: &str, role: &str, inherited: bool) -> Result<Vec<Permission>> {
        let directory = &self.core.directory;
        let closure = if inherited {
            self.core
                .roles
                .read(directory, context_id, |graph| graph.ascendant_keys(role))
                .await??
        } else {
            let role = directory.require_role(context_id, role).await?;
            HashSet::from([normalize(&role.name)])
        };

        let permissions = directory.list_permissions(context_id, false).await?;
        Ok(permissions
            .into_iter()
            .filter(|p| p.roles.iter().any(|r| closure.contains(&normalize(r))))
            .collect())
    }

    /// Permissions reachable through every assigned role and direct grants
    pub async fn user_permissions(&self, context_id: &str, user_id: &str) -> Result<Vec<Permission>> {
        let directory = &self.core.directory;
        let user = directory.require_user(context_id, user_id).await?;
        let names = user.role_names();
        let closure = self
            .core
            .roles
            .read(directory, context_id, |graph| {
                graph.closure_up(names.iter().map(String::as_str))
            })
            .await?;

        let permissions = directory.list_permissions(context_id, false).await?;
        Ok(permissions
            .into_iter()
            .filter(|p| {
                p.granted_to_user(&user.user_id)
                    || p.roles.iter().any(|r| closure.contains(&normalize(r)))
            })
            .collect())
    }

    /// Roles holding a direct grant of the permission
    pub async fn permission_roles(&self, context_id: &str, obj_name: &str, op_name: &str) -> Result<BTreeSet<String>> {
        let permission = self
            .core
            .directory
            .require_permission(context_id, obj_name, op_name, false)
            .await?;
        Ok(permission.roles)
    }

    /// Roles holding the permission directly or through inheritance
    pub async fn authorized_permission_roles(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
    ) -> Result<BTreeSet<String>> {
        let directory = &self.core.directory;
        let permission = directory
            .require_permission(context_id, obj_name, op_name, false)
            .await?;

        self.core
            .roles
            .read(directory, context_id, |graph| {
                let mut roles = BTreeSet::new();
                for granted in &permission.roles {
                    match graph.descendants(granted) {
                        Ok(below) => roles.extend(below),
                        Err(_) => {
                            roles.insert(granted.clone());
                        }
                    }
                }
                roles
            })
            .await
    }

    /// Users holding a direct grant of the permission
    pub async fn permission_users(&self, context_id: &str, obj_name: &str, op_name: &str) -> Result<BTreeSet<String>> {
        let permission = self
            .core
            .directory
            .require_permission(context_id, obj_name, op_name, false)
            .await?;
        Ok(permission.users)
    }

    /// Static SD sets naming the role
    pub async fn ssd_role_sets(&self, context_id: &str, role: &str) -> Result<Vec<SdSet>> {
        self.role_sets(context_id, SdType::Static, role).await
    }

    /// Dynamic SD sets naming the role
    pub async fn dsd_role_sets(&self, context_id: &str, role: &str) -> Result<Vec<SdSet>> {
        self.role_sets(context_id, SdType::Dynamic, role).await
    }

    async fn role_sets(&self, context_id: &str, sd_type: SdType, role: &str) -> Result<Vec<SdSet>> {
        let directory = &self.core.directory;
        let role = directory.require_role(context_id, role).await?;
        let sets = directory.read_sd_sets(context_id, sd_type).await?;
        Ok(sets.into_iter().filter(|s| s.contains(&role.name)).collect())
    }

    /// Users matching every criterion in `filter`, without credentials
    pub async fn find_users(&self, context_id: &str, filter: &UserFilter) -> Result<Vec<User>> {
        let users = self.core.directory.search_users(context_id, filter).await?;
        Ok(users.into_iter().map(strip_credentials).collect())
    }

    /// Roles whose name starts with `prefix` (case-insensitive)
    pub async fn find_roles(&self, context_id: &str, prefix: &str) -> Result<Vec<Role>> {
        let prefix = normalize(prefix);
        let mut roles: Vec<Role> = self
            .core
            .directory
            .list_roles(context_id)
            .await?
            .into_iter()
            .filter(|r| normalize(&r.name).starts_with(&prefix))
            .collect();
        roles.sort_by_key(|r| normalize(&r.name));
        Ok(roles)
    }
}
