//! Administrative role administration

use super::manager::{AdminManager, Grantee};
use crate::core::models::{AdminRole, Constraint, EdgeOp, RoleRange, UserRole};
use crate::directory::UserFilter;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{same_name, validate_context_id, validate_description, validate_name};
use std::collections::BTreeSet;
use tracing::info;

/// Mutable admin role attributes; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRoleUpdate {
    pub description: Option<String>,
    pub constraint: Option<Constraint>,
    pub os_u: Option<BTreeSet<String>>,
    pub os_p: Option<BTreeSet<String>>,
    pub range: Option<RoleRange>,
}

impl AdminManager {
    /// Range endpoints must be existing RBAC roles
    async fn check_range(&self, context_id: &str, range: Option<&RoleRange>) -> Result<()> {
        if let Some(range) = range {
            self.core.directory.require_role(context_id, &range.begin).await?;
            self.core.directory.require_role(context_id, &range.end).await?;
        }
        Ok(())
    }

    pub async fn add_admin_role(&self, context_id: &str, role: AdminRole) -> Result<AdminRole> {
        validate_context_id(context_id)?;
        validate_name("admin role name", &role.name)?;
        validate_description(role.description.as_deref())?;
        self.check_range(context_id, role.range.as_ref()).await?;

        let directory = &self.core.directory;
        let writer = self.core.admin_roles.writer(directory, context_id).await?;
        let mut graph = writer.preview();
        if directory.read_admin_role(context_id, &role.name).await?.is_some() {
            return Err(RbacError::already_exists(format!(
                "Admin role '{}' already exists",
                role.name
            )));
        }
        graph.add_node(&role.name)?;

        let role = AdminRole {
            parents: Default::default(),
            children: Default::default(),
            ..role
        };
        directory.write_admin_role(context_id, &role).await?;
        writer.commit(graph);

        SecurityLogger::log_admin_event(context_id, "add_admin_role", &role.name);
        Ok(role)
    }

    pub async fn update_admin_role(&self, context_id: &str, name: &str, update: AdminRoleUpdate) -> Result<AdminRole> {
        validate_description(update.description.as_deref())?;
        self.check_range(context_id, update.range.as_ref()).await?;

        let directory = &self.core.directory;
        let mut role = directory.require_admin_role(context_id, name).await?;
        if let Some(description) = update.description {
            role.description = Some(description);
        }
        if let Some(constraint) = update.constraint {
            role.constraint = constraint;
        }
        if let Some(os_u) = update.os_u {
            role.os_u = os_u;
        }
        if let Some(os_p) = update.os_p {
            role.os_p = os_p;
        }
        if let Some(range) = update.range {
            role.range = Some(range);
        }
        directory.write_admin_role(context_id, &role).await?;

        SecurityLogger::log_admin_event(context_id, "update_admin_role", &role.name);
        Ok(role)
    }

    /// Delete an admin role with its edges, user assignments and grants
    pub async fn delete_admin_role(&self, context_id: &str, name: &str) -> Result<()> {
        let directory = &self.core.directory;
        let writer = self.core.admin_roles.writer(directory, context_id).await?;
        let role = directory.require_admin_role(context_id, name).await?;
        let mut graph = writer.preview();
        let (parents, children) = graph.remove_node(&role.name)?;

        for parent in &parents {
            directory
                .write_admin_role_edge(context_id, parent, &role.name, EdgeOp::Remove)
                .await?;
        }
        for child in &children {
            directory
                .write_admin_role_edge(context_id, &role.name, child, EdgeOp::Remove)
                .await?;
        }

        for user in directory
            .search_users(context_id, &UserFilter::with_admin_role(&role.name))
            .await?
        {
            let _guard = self.core.user_locks.acquire(context_id, &user.user_id).await;
            if let Some(mut user) = directory.read_user(context_id, &user.user_id).await? {
                user.admin_roles.retain(|r| !same_name(&r.name, &role.name));
                directory.write_user(context_id, &user).await?;
            }
        }

        for mut permission in directory.list_permissions(context_id, true).await? {
            if permission.granted_to_role(&role.name) {
                permission.roles.retain(|r| !same_name(r, &role.name));
                directory.write_permission(context_id, &permission).await?;
            }
        }

        directory.delete_admin_role(context_id, &role.name).await?;
        writer.commit(graph);

        SecurityLogger::log_admin_event(context_id, "delete_admin_role", &role.name);
        Ok(())
    }

    pub async fn assign_admin_user(
        &self,
        context_id: &str,
        user_id: &str,
        role: &str,
        constraint: Option<Constraint>,
    ) -> Result<()> {
        let directory = &self.core.directory;
        let role = directory.require_admin_role(context_id, role).await?;

        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        if user.has_admin_role(&role.name) {
            return Err(RbacError::already_exists(format!(
                "Admin role '{}' is already assigned to user '{}'",
                role.name, user.user_id
            )));
        }

        user.admin_roles.push(UserRole {
            name: role.name.clone(),
            constraint: constraint.unwrap_or_default(),
        });
        directory.write_user(context_id, &user).await?;

        info!(context_id, user_id, admin_role = %role.name, "Assigned admin role");
        SecurityLogger::log_admin_event(context_id, "assign_admin_user", user_id);
        Ok(())
    }

    pub async fn deassign_admin_user(&self, context_id: &str, user_id: &str, role: &str) -> Result<()> {
        let directory = &self.core.directory;
        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        if !user.has_admin_role(role) {
            return Err(RbacError::role_not_assigned(format!(
                "Admin role '{}' is not assigned to user '{}'",
                role, user.user_id
            )));
        }

        user.admin_roles.retain(|r| !same_name(&r.name, role));
        directory.write_user(context_id, &user).await?;

        info!(context_id, user_id, admin_role = role, "Deassigned admin role");
        SecurityLogger::log_admin_event(context_id, "deassign_admin_user", user_id);
        Ok(())
    }

    /// Grant an ARBAC permission to an admin role
    pub async fn grant_admin_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        role: &str,
    ) -> Result<()> {
        self.edit_grant(context_id, obj_name, op_name, Grantee::AdminRole(role), true)
            .await
    }

    pub async fn revoke_admin_permission(
        &self,
        context_id: &str,
        obj_name: &str,
        op_name: &str,
        role: &str,
    ) -> Result<()> {
        self.edit_grant(context_id, obj_name, op_name, Grantee::AdminRole(role), false)
            .await
    }
}
