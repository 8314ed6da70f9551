//! User, role and permission administration

use crate::core::hierarchy::GraphKind;
use crate::core::models::{Constraint, EdgeOp, Permission, Role, SdType, User, UserRole};
use crate::core::pwpolicy::check_new_secret;
use crate::core::shared::EngineCore;
use crate::directory::UserFilter;
use crate::utils::crypto::hash_password;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{same_name, validate_context_id, validate_description, validate_name};
use futures::future::try_join_all;
use tracing::{debug, info, warn};

/// Mutable user attributes; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub ou: Option<String>,
    pub description: Option<String>,
}

/// Mutable role attributes; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    pub description: Option<String>,
    pub constraint: Option<Constraint>,
}

/// Who receives a permission grant
#[derive(Debug, Clone, Copy)]
pub(super) enum Grantee<'a> {
    Role(&'a str),
    AdminRole(&'a str),
    User(&'a str),
}

/// Administrative entry points for the data model
#[derive(Clone, Debug)]
pub struct AdminManager {
    pub(super) core: EngineCore,
}

impl AdminManager {
    pub(crate) fn new(core: EngineCore) -> Self {
        Self { core }
    }

    // ---- users ----

    /// Create a user, optionally with an initial password.
    ///
    /// Assigned roles must exist and satisfy static separation of duty.
    pub async fn add_user(&self, context_id: &str, mut user: User, password: Option<&str>) -> Result<User> {
        validate_context_id(context_id)?;
        validate_name("user id", &user.user_id)?;
        validate_description(user.description.as_deref())?;
        if let Some(ou) = &user.ou {
            validate_name("organizational unit", ou)?;
        }

        let directory = &self.core.directory;
        let _guard = self.core.user_locks.acquire(context_id, &user.user_id).await;
        if directory.read_user(context_id, &user.user_id).await?.is_some() {
            return Err(RbacError::already_exists(format!(
                "User '{}' already exists",
                user.user_id
            )));
        }

        try_join_all(user.roles.iter().map(|r| directory.require_role(context_id, &r.name))).await?;
        try_join_all(
            user.admin_roles
                .iter()
                .map(|r| directory.require_admin_role(context_id, &r.name)),
        )
        .await?;
        self.core
            .check_ssd(context_id, &user.role_names(), &[])
            .await?;

        user.auth_state = Default::default();
        user.password_hash = None;
        if let Some(secret) = password {
            let policy = self.core.effective_policy(context_id, &user).await?;
            check_new_secret(&policy, &user, secret)?;
            user.password_hash = Some(hash_password(secret)?);
            user.auth_state.password_changed_at = Some(self.core.now());
        } else if let Some(policy) = &user.pw_policy {
            directory.require_policy(context_id, policy).await?;
        }

        directory.write_user(context_id, &user).await?;
        SecurityLogger::log_admin_event(context_id, "add_user", &user.user_id);
        Ok(user)
    }

    pub async fn update_user(&self, context_id: &str, user_id: &str, update: UserUpdate) -> Result<User> {
        if let Some(ou) = &update.ou {
            validate_name("organizational unit", ou)?;
        }
        validate_description(update.description.as_deref())?;

        let directory = &self.core.directory;
        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        if let Some(ou) = update.ou {
            user.ou = Some(ou);
        }
        if let Some(description) = update.description {
            user.description = Some(description);
        }
        directory.write_user(context_id, &user).await?;

        SecurityLogger::log_admin_event(context_id, "update_user", user_id);
        Ok(user)
    }

    /// Delete a user and every direct permission grant to it
    pub async fn delete_user(&self, context_id: &str, user_id: &str) -> Result<()> {
        let directory = &self.core.directory;
        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let user = directory.require_user(context_id, user_id).await?;

        for admin in [false, true] {
            for mut permission in directory.list_permissions(context_id, admin).await? {
                if permission.granted_to_user(&user.user_id) {
                    permission.users.retain(|u| !same_name(u, &user.user_id));
                    directory.write_permission(context_id, &permission).await?;
                }
            }
        }
        directory.delete_user(context_id, &user.user_id).await?;

        SecurityLogger::log_admin_event(context_id, "delete_user", user_id);
        Ok(())
    }

    pub async fn read_user(&self, context_id: &str, user_id: &str) -> Result<User> {
        let mut user = self.core.directory.require_user(context_id, user_id).await?;
        user.password_hash = None;
        user.auth_state.history.clear();
        Ok(user)
    }

    // ---- roles ----

    /// Create a role with no edges
    pub async fn add_role(&self, context_id: &str, role: Role) -> Result<Role> {
        validate_context_id(context_id)?;
        validate_name("role name", &role.name)?;
        validate_description(role.description.as_deref())?;

        let directory = &self.core.directory;
        let writer = self.core.roles.writer(directory, context_id).await?;
        let mut graph = writer.preview();
        if directory.read_role(context_id, &role.name).await?.is_some() {
            return Err(RbacError::already_exists(format!(
                "Role '{}' already exists",
                role.name
            )));
        }
        graph.add_node(&role.name)?;

        let role = Role {
            parents: Default::default(),
            children: Default::default(),
            ..role
        };
        directory.write_role(context_id, &role).await?;
        writer.commit(graph);

        SecurityLogger::log_admin_event(context_id, "add_role", &role.name);
        Ok(role)
    }

    pub async fn update_role(&self, context_id: &str, name: &str, update: RoleUpdate) -> Result<Role> {
        validate_description(update.description.as_deref())?;

        let directory = &self.core.directory;
        let mut role = directory.require_role(context_id, name).await?;
        if let Some(description) = update.description {
            role.description = Some(description);
        }
        if let Some(constraint) = update.constraint {
            role.constraint = constraint;
        }
        directory.write_role(context_id, &role).await?;

        SecurityLogger::log_admin_event(context_id, "update_role", &role.name);
        Ok(role)
    }

    /// Delete a role together with its edges, user assignments, permission
    /// grants and separation-of-duty memberships.
    ///
    /// References are removed before edges, so a failed reference write
    /// leaves the hierarchy untouched. If a write fails once edges have
    /// changed, the cached graph is dropped and reloaded on next use.
    pub async fn delete_role(&self, context_id: &str, name: &str) -> Result<()> {
        let directory = &self.core.directory;
        let writer = self.core.roles.writer(directory, context_id).await?;
        let role = directory.require_role(context_id, name).await?;
        let mut graph = writer.preview();
        let (parents, children) = graph.remove_node(&role.name)?;

        self.purge_role_references(context_id, &role.name).await?;

        if let Err(err) = self
            .remove_role_record(context_id, &role.name, &parents, &children)
            .await
        {
            warn!(context_id, role = %role.name, error = %err, "Role deletion failed part-way, dropping cached graph");
            self.core.roles.invalidate(context_id);
            return Err(err);
        }
        writer.commit(graph);

        SecurityLogger::log_admin_event(context_id, "delete_role", &role.name);
        Ok(())
    }

    async fn purge_role_references(&self, context_id: &str, role: &str) -> Result<()> {
        let directory = &self.core.directory;
        for user in directory
            .search_users(context_id, &UserFilter::with_role(role))
            .await?
        {
            let _guard = self.core.user_locks.acquire(context_id, &user.user_id).await;
            if let Some(mut user) = directory.read_user(context_id, &user.user_id).await? {
                user.roles.retain(|r| !same_name(&r.name, role));
                directory.write_user(context_id, &user).await?;
            }
        }

        for mut permission in directory.list_permissions(context_id, false).await? {
            if permission.granted_to_role(role) {
                permission.roles.retain(|r| !same_name(r, role));
                directory.write_permission(context_id, &permission).await?;
            }
        }

        for sd_type in [SdType::Static, SdType::Dynamic] {
            for mut set in directory.read_sd_sets(context_id, sd_type).await? {
                if set.contains(role) {
                    set.members.retain(|m| !same_name(m, role));
                    debug!(context_id, set_name = %set.name, role, "Removing deleted role from set");
                    directory.write_sd_set(context_id, &set).await?;
                }
            }
        }
        Ok(())
    }

    async fn remove_role_record(
        &self,
        context_id: &str,
        role: &str,
        parents: &[String],
        children: &[String],
    ) -> Result<()> {
        let directory = &self.core.directory;
        for parent in parents {
            directory
                .write_role_edge(context_id, parent, role, EdgeOp::Remove)
                .await?;
        }
        for child in children {
            directory
                .write_role_edge(context_id, role, child, EdgeOp::Remove)
                .await?;
        }
        directory.delete_role(context_id, role).await
    }

    // ---- assignment ----

    /// Assign `role` to `user_id`, subject to static separation of duty
    pub async fn assign_user(
        &self,
        context_id: &str,
        user_id: &str,
        role: &str,
        constraint: Option<Constraint>,
    ) -> Result<()> {
        let directory = &self.core.directory;
        let role = directory.require_role(context_id, role).await?;

        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        if user.has_role(&role.name) {
            return Err(RbacError::already_exists(format!(
                "Role '{}' is already assigned to user '{}'",
                role.name, user.user_id
            )));
        }

        self.core
            .check_ssd(context_id, std::slice::from_ref(&role.name), &user.role_names())
            .await?;

        user.roles.push(UserRole {
            name: role.name.clone(),
            constraint: constraint.unwrap_or_default(),
        });
        directory.write_user(context_id, &user).await?;

        info!(context_id, user_id, role = %role.name, "Assigned role");
        SecurityLogger::log_admin_event(context_id, "assign_user", user_id);
        Ok(())
    }

    pub async fn deassign_user(&self, context_id: &str, user_id: &str, role: &str) -> Result<()> {
        let directory = &self.core.directory;
        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        if !user.has_role(role) {
            return Err(RbacError::role_not_assigned(format!(
                "Role '{}' is not assigned to user '{}'",
                role, user.user_id
            )));
        }

        user.roles.retain(|r| !same_name(&r.name, role));
        directory.write_user(context_id, &user).await?;

        info!(context_id, user_id, role, "Deassigned role");
        SecurityLogger::log_admin_event(context_id, "deassign_user", user_id);
        Ok(())
    }

    // ---- permissions ----

    /// Create a permission; any roles or users it names must exist
    pub async fn add_permission(&self, context_id: &str, permission: Permission) -> Result<Permission> {
        validate_context_id(context_id)?;
        validate_name("object name", &permission.obj_name)?;
        validate_name("operation name", &permission.op_name)?;
        validate_description(permission.description.as_deref())?;

        let directory = &self.core.directory;
        if directory
            .read_permission(context_id, &permission.obj_name, &permission.op_name, permission.admin)
            .await?
            .is_some()
        {
            return Err(RbacError::already_exists(format!(
                "Permission '{}.{}' already exists",
                permission.obj_name, permission.op_name
            )));
        }

        for role in &permission.roles {
            if permission.admin {
                directory.require_admin_role(context_id, role).await?;
            } else {
                directory.require_role(context_id, role).await?;
            }
        }
        for user in &permission.users {
            directory.require_user(context_id, user).await?;
        }

        directory.write_permission(context_id, &permission).await?;
        SecurityLogger::log_admin_event(
            context_id,
            "add_permission",
            &format!("{}.{}", permission.obj_name, permission.op_name),
        );
        Ok(permission)
    }

    pub async fn delete_permission(&self, context_id: &str, obj_name: &str, op_name: &str, admin: bool) -> Result<()> {
        let directory = &self.core.directory;
        let permission = directory
            .require_permission(context_id, obj_name, op_name, admin)
            .await?;
        directory
            .delete_permission(context_id, &permission.obj_name, &permission.op_name, admin)
            .await?;

        SecurityLogger::log_admin_event(
            context_id,
            "delete_permission",
            &format!("{}.{}", obj_name, op_name),
        );
        Ok(())
    }

    pub async fn grant_permission(&self, context_id: &str, obj_name: &str, op_name: &str, role: &str) -> Result<()> {
        self.edit_grant(context_id, obj_name, op_name, Grantee::Role(role), true)
            .await
    }

    pub async fn revoke_permission(&self, context_id: &str, obj_name: &str, op_name: &str, role: &str) -> Result<()> {
        self.edit_grant(context_id, obj_name, op_name, Grantee::Role(role), false)
            .await
    }

    /// Grant directly to a user, bypassing roles
    pub async fn grant_user_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        user_id: &str,
    ) -> Result<()> {
        self.edit_grant(context_id, obj_name, op_name, Grantee::User(user_id), true)
            .await
    }

    pub async fn revoke_user_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        user_id: &str,
    ) -> Result<()> {
        self.edit_grant(context_id, obj_name, op_name, Grantee::User(user_id), false)
            .await
    }

    /// Add or remove a grant. Admin-role grants apply to ARBAC permissions,
    /// role and user grants to RBAC permissions.
    pub(super) async fn edit_grant(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        grantee: Grantee<'_>,
        grant: bool,
    ) -> Result<()> {
        let directory = &self.core.directory;
        let admin = matches!(grantee, Grantee::AdminRole(_));
        let mut permission = directory
            .require_permission(context_id, obj_name, op_name, admin)
            .await?;

        let (name, held) = match grantee {
            Grantee::Role(role) => {
                let role = directory.require_role(context_id, role).await?;
                let held = permission.granted_to_role(&role.name);
                (role.name, held)
            }
            Grantee::AdminRole(role) => {
                let role = directory.require_admin_role(context_id, role).await?;
                let held = permission.granted_to_role(&role.name);
                (role.name, held)
            }
            Grantee::User(user_id) => {
                let user = directory.require_user(context_id, user_id).await?;
                let held = permission.granted_to_user(&user.user_id);
                (user.user_id, held)
            }
        };

        match (grant, held) {
            (true, true) => {
                return Err(RbacError::already_exists(format!(
                    "Permission '{}.{}' is already granted to '{}'",
                    permission.obj_name, permission.op_name, name
                )));
            }
            (false, false) => {
                return Err(RbacError::permission_not_found(format!(
                    "Permission '{}.{}' is not granted to '{}'",
                    permission.obj_name, permission.op_name, name
                )));
            }
            _ => {}
        }

        let set = match grantee {
            Grantee::User(_) => &mut permission.users,
            _ => &mut permission.roles,
        };
        if grant {
            set.insert(name.clone());
        } else {
            set.retain(|n| !same_name(n, &name));
        }
        directory.write_permission(context_id, &permission).await?;

        info!(
            context_id,
            obj_name = %permission.obj_name,
            op_name = %permission.op_name,
            grantee = %name,
            grant,
            "Permission grant changed"
        );
        SecurityLogger::log_admin_event(
            context_id,
            if grant { "grant_permission" } else { "revoke_permission" },
            &format!("{}.{}", permission.obj_name, permission.op_name),
        );
        Ok(())
    }

    // ---- credentials ----

    /// User-initiated password change
    pub async fn change_password(
        &self,
        context_id: &str,
        user_id: &str,
        current: Option<&str>,
        new_secret: &str,
    ) -> Result<()> {
        self.core
            .change_password(context_id, user_id, current, new_secret)
            .await
    }

    /// Administrative reset; the user must change it again if the policy
    /// says so
    pub async fn reset_password(&self, context_id: &str, user_id: &str, new_secret: &str) -> Result<()> {
        self.core.reset_password(context_id, user_id, new_secret).await
    }

    pub async fn lock_user_account(&self, context_id: &str, user_id: &str) -> Result<()> {
        self.core.lock_account(context_id, user_id).await
    }

    pub async fn unlock_user_account(&self, context_id: &str, user_id: &str) -> Result<()> {
        self.core.unlock_account(context_id, user_id).await
    }

    pub(super) fn graph_kind_name(kind: GraphKind) -> &'static str {
        match kind {
            GraphKind::Rbac => "role",
            GraphKind::Arbac => "admin role",
        }
    }
}
