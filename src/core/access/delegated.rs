//! Delegated administration checks against administrative sessions

use super::activation;
use super::manager::AccessManager;
use crate::core::hierarchy::RoleGraph;
use crate::core::models::{AdminRole, Permission, RoleRange, Session};
use crate::core::shared::EngineCore;
use crate::utils::error::Result;
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{normalize, same_name};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Whether `role` lies inside `range` in the RBAC graph
pub(super) fn in_range(graph: &RoleGraph, range: &RoleRange, role: &str) -> bool {
    if !graph.contains(role) {
        return false;
    }
    if !graph.inherits(role, &range.begin) || !graph.inherits(&range.end, role) {
        return false;
    }
    if !range.begin_inclusive && same_name(role, &range.begin) {
        return false;
    }
    if !range.end_inclusive && same_name(role, &range.end) {
        return false;
    }
    true
}

fn ou_in_pool(pool: &BTreeSet<String>, ou: Option<&str>) -> bool {
    ou.is_some_and(|ou| pool.iter().any(|p| same_name(p, ou)))
}

/// ARBAC checks: admin permissions and user/permission OU and role-range scoping
#[derive(Clone, Debug)]
pub struct DelegatedAccessManager {
    core: EngineCore,
    access: AccessManager,
}

impl DelegatedAccessManager {
    pub(crate) fn new(core: EngineCore) -> Self {
        let access = AccessManager::new(core.clone());
        Self { core, access }
    }

    fn live_admin_names(session: &Session, now: DateTime<Utc>) -> Vec<String> {
        let clock = session.clock();
        session
            .admin_roles
            .iter()
            .filter(|r| activation::is_live(r, now, &clock))
            .map(|r| r.name.clone())
            .collect()
    }

    /// Case-folded ARBAC closure of the session's live admin roles
    async fn admin_closure(&self, session: &Session, now: DateTime<Utc>) -> Result<HashSet<String>> {
        let live = Self::live_admin_names(session, now);
        if live.is_empty() {
            return Ok(HashSet::new());
        }
        self.core
            .admin_roles
            .read(&self.core.directory, &session.context_id, |graph| {
                graph.closure_up(live.iter().map(String::as_str))
            })
            .await
    }

    /// Admin role records in force for the session
    async fn effective_admin_roles(&self, session: &Session) -> Result<Vec<AdminRole>> {
        let now = self.access.ensure_live(session)?;
        let closure = self.admin_closure(session, now).await?;
        if closure.is_empty() {
            return Ok(Vec::new());
        }
        let roles = self
            .core
            .directory
            .list_admin_roles(&session.context_id)
            .await?;
        Ok(roles
            .into_iter()
            .filter(|r| closure.contains(&normalize(&r.name)))
            .collect())
    }

    /// Whether the administrative session holds an ARBAC permission
    pub async fn check_admin_access(&self, session: &Session, obj_name: &str, op_name: &str) -> Result<bool> {
        let now = self.access.ensure_live(session)?;
        let context_id = session.context_id.as_str();

        let Some(permission) = self
            .core
            .directory
            .read_permission(context_id, obj_name, op_name, true)
            .await?
        else {
            SecurityLogger::log_authz_event(context_id, &session.user_id, obj_name, op_name, false);
            return Ok(false);
        };

        let closure = self.admin_closure(session, now).await?;
        let granted = permission.granted_to_user(&session.user_id)
            || permission.roles.iter().any(|r| closure.contains(&normalize(r)));

        SecurityLogger::log_authz_event(context_id, &session.user_id, obj_name, op_name, granted);
        Ok(granted)
    }

    /// Every ARBAC permission the administrative session holds
    pub async fn admin_session_permissions(&self, session: &Session) -> Result<Vec<Permission>> {
        let now = self.access.ensure_live(session)?;
        let closure = self.admin_closure(session, now).await?;
        let permissions = self
            .core
            .directory
            .list_permissions(&session.context_id, true)
            .await?;

        Ok(permissions
            .into_iter()
            .filter(|p| {
                p.granted_to_user(&session.user_id)
                    || p.roles.iter().any(|r| closure.contains(&normalize(r)))
            })
            .collect())
    }

    /// Some admin role in force must cover `ou` in its pool and `role` in its range
    async fn user_scope(&self, session: &Session, user_id: &str, role: &str) -> Result<bool> {
        let admin_roles = self.effective_admin_roles(session).await?;
        if admin_roles.is_empty() {
            return Ok(false);
        }
        let user = self
            .core
            .directory
            .require_user(&session.context_id, user_id)
            .await?;

        let candidates: Vec<&AdminRole> = admin_roles
            .iter()
            .filter(|a| ou_in_pool(&a.os_u, user.ou.as_deref()))
            .collect();
        self.any_in_range(session, &candidates, role).await
    }

    async fn permission_scope(
        &self,
        session: &Session,
        role: &str,
        obj_name: &str,
        op_name: &str,
    ) -> Result<bool> {
        let admin_roles = self.effective_admin_roles(session).await?;
        if admin_roles.is_empty() {
            return Ok(false);
        }
        let permission = self
            .core
            .directory
            .require_permission(&session.context_id, obj_name, op_name, false)
            .await?;

        let candidates: Vec<&AdminRole> = admin_roles
            .iter()
            .filter(|a| ou_in_pool(&a.os_p, permission.ou.as_deref()))
            .collect();
        self.any_in_range(session, &candidates, role).await
    }

    async fn any_in_range(&self, session: &Session, candidates: &[&AdminRole], role: &str) -> Result<bool> {
        let ranges: Vec<&RoleRange> = candidates.iter().filter_map(|a| a.range.as_ref()).collect();
        if ranges.is_empty() {
            return Ok(false);
        }
        self.core
            .roles
            .read(&self.core.directory, &session.context_id, |graph| {
                ranges.iter().any(|range| in_range(graph, range, role))
            })
            .await
    }

    /// Whether the session may assign `role` to `user_id`
    pub async fn can_assign(&self, session: &Session, user_id: &str, role: &str) -> Result<bool> {
        let allowed = self.user_scope(session, user_id, role).await?;
        debug!(context_id = %session.context_id, admin = %session.user_id, user_id, role, allowed, "can_assign");
        Ok(allowed)
    }

    /// Whether the session may remove `role` from `user_id`
    pub async fn can_deassign(&self, session: &Session, user_id: &str, role: &str) -> Result<bool> {
        let allowed = self.user_scope(session, user_id, role).await?;
        debug!(context_id = %session.context_id, admin = %session.user_id, user_id, role, allowed, "can_deassign");
        Ok(allowed)
    }

    /// Whether the session may grant the permission to `role`
    pub async fn can_grant(&self, session: &Session, role: &str, obj_name: &str, op_name: &str) -> Result<bool> {
        let allowed = self.permission_scope(session, role, obj_name, op_name).await?;
        debug!(context_id = %session.context_id, admin = %session.user_id, role, obj_name, op_name, allowed, "can_grant");
        Ok(allowed)
    }

    /// Whether the session may revoke the permission from `role`
    pub async fn can_revoke(&self, session: &Session, role: &str, obj_name: &str, op_name: &str) -> Result<bool> {
        let allowed = self.permission_scope(session, role, obj_name, op_name).await?;
        debug!(context_id = %session.context_id, admin = %session.user_id, role, obj_name, op_name, allowed, "can_revoke");
        Ok(allowed)
    }
}
