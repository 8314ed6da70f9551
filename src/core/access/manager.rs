//! Session lifecycle and permission checks

use super::activation::{self, ActivationMode};
use crate::core::hierarchy::GraphKind;
use crate::core::models::{ActiveRole, Permission, Session, User, UserRole};
use crate::core::shared::EngineCore;
use crate::utils::clock::seconds;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{normalize, validate_context_id};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Parameters of a session creation request
#[derive(Clone, Default)]
pub struct SessionRequest {
    pub user_id: String,
    /// Credential; not needed for trusted requests
    pub secret: Option<String>,
    /// RBAC roles to activate; `None` activates every assigned role that
    /// currently satisfies its constraints
    pub roles: Option<Vec<String>>,
    /// ARBAC roles to activate, same defaulting as `roles`
    pub admin_roles: Option<Vec<String>>,
    /// Skip credential verification
    pub trusted: bool,
}

impl SessionRequest {
    pub fn new(user_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Request for a caller that has already established the user's identity
    pub fn trusted(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            trusted: true,
            ..Self::default()
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_admin_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

impl fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRequest")
            .field("user_id", &self.user_id)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("roles", &self.roles)
            .field("admin_roles", &self.admin_roles)
            .field("trusted", &self.trusted)
            .finish()
    }
}

/// Session creation, activation changes and permission checks
#[derive(Clone, Debug)]
pub struct AccessManager {
    core: EngineCore,
}

impl AccessManager {
    pub(crate) fn new(core: EngineCore) -> Self {
        Self { core }
    }

    /// Authenticate and build a session.
    ///
    /// Authentication state changes are persisted even when creation fails.
    /// Role activation is all-or-nothing: a DSD conflict rejects the whole
    /// request.
    pub async fn create_session(&self, context_id: &str, request: SessionRequest) -> Result<Session> {
        validate_context_id(context_id)?;

        let (user, outcome) = self
            .core
            .authenticate(
                context_id,
                &request.user_id,
                request.secret.as_deref(),
                request.trusted,
            )
            .await?;
        let now = self.core.now();

        let roles = self
            .select_roles(
                context_id,
                GraphKind::Rbac,
                &user.roles,
                request.roles.as_deref(),
                now,
            )
            .await?;
        let admin_roles = self
            .select_roles(
                context_id,
                GraphKind::Arbac,
                &user.admin_roles,
                request.admin_roles.as_deref(),
                now,
            )
            .await?;

        let names: Vec<String> = roles.iter().map(|r| r.name.clone()).collect();
        self.core.check_dsd(context_id, &names, &[]).await?;

        let mut session = Session {
            id: Uuid::new_v4(),
            context_id: context_id.to_string(),
            user_id: user.user_id.clone(),
            roles,
            admin_roles,
            created_at: now,
            last_access: now,
            absolute_deadline: None,
            idle_timeout_secs: None,
            expiration_seconds: outcome.expiration_seconds,
            grace_logins_remaining: outcome.grace_logins_remaining,
            trusted: request.trusted,
        };
        self.refresh_timers(&mut session);

        info!(
            context_id,
            user_id = %session.user_id,
            session_id = %session.id,
            roles = ?session.role_names(),
            admin_roles = session.admin_roles.len(),
            trusted = session.trusted,
            "Session created"
        );
        Ok(session)
    }

    /// Resolve the activation set for one role space
    async fn select_roles(
        &self,
        context_id: &str,
        kind: GraphKind,
        assigned: &[UserRole],
        requested: Option<&[String]>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveRole>> {
        let (mode, candidates): (ActivationMode, Vec<&UserRole>) = match requested {
            Some(names) => {
                let mut picked = Vec::with_capacity(names.len());
                for name in names {
                    let key = normalize(name);
                    let assignment = assigned
                        .iter()
                        .find(|r| normalize(&r.name) == key)
                        .ok_or_else(|| {
                            RbacError::role_not_assigned(format!(
                                "Role '{}' is not assigned to the user",
                                name
                            ))
                        })?;
                    picked.push(assignment);
                }
                (ActivationMode::Explicit, picked)
            }
            None => (ActivationMode::Default, assigned.iter().collect()),
        };

        let mut seen = HashSet::new();
        let mut active = Vec::with_capacity(candidates.len());
        for assignment in candidates {
            if !seen.insert(normalize(&assignment.name)) {
                continue;
            }

            let role_constraint = match self.role_constraint(context_id, kind, &assignment.name).await {
                Ok(c) => c,
                Err(RbacError::RoleNotFound(detail)) if mode == ActivationMode::Default => {
                    warn!(context_id, role = %assignment.name, "Assigned role no longer exists: {}", detail);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if activation::admit(mode, &assignment.name, &assignment.constraint, &role_constraint, now)? {
                active.push(ActiveRole {
                    name: assignment.name.clone(),
                    assignment: assignment.constraint.clone(),
                    role: role_constraint,
                });
            }
        }
        Ok(active)
    }

    async fn role_constraint(
        &self,
        context_id: &str,
        kind: GraphKind,
        name: &str,
    ) -> Result<crate::core::models::Constraint> {
        let directory = &self.core.directory;
        match kind {
            GraphKind::Rbac => Ok(directory.require_role(context_id, name).await?.constraint),
            GraphKind::Arbac => Ok(directory.require_admin_role(context_id, name).await?.constraint),
        }
    }

    fn refresh_timers(&self, session: &mut Session) {
        let (max_duration, idle) = activation::session_timers(
            &self.core.config.session,
            session.roles.iter().chain(session.admin_roles.iter()),
        );
        session.absolute_deadline = max_duration.map(|secs| session.created_at + seconds(secs));
        session.idle_timeout_secs = idle;
    }

    /// Fail with `SessionExpired` when either deadline has passed
    pub(crate) fn ensure_live(&self, session: &Session) -> Result<DateTime<Utc>> {
        let now = self.core.now();
        if session.is_expired_at(now) {
            debug!(session_id = %session.id, "Session expired");
            return Err(RbacError::session_expired(format!(
                "Session {} has expired",
                session.id
            )));
        }
        Ok(now)
    }

    /// Activated roles whose constraints still hold at `now`
    fn live_role_names(session: &Session, now: DateTime<Utc>) -> Vec<String> {
        let clock = session.clock();
        session
            .roles
            .iter()
            .filter(|r| activation::is_live(r, now, &clock))
            .map(|r| r.name.clone())
            .collect()
    }

    async fn role_closure(&self, session: &Session, now: DateTime<Utc>) -> Result<HashSet<String>> {
        let live = Self::live_role_names(session, now);
        self.core
            .roles
            .read(&self.core.directory, &session.context_id, |graph| {
                graph.closure_up(live.iter().map(String::as_str))
            })
            .await
    }

    fn reachable(permission: &Permission, closure: &HashSet<String>, user_id: &str) -> bool {
        permission.granted_to_user(user_id)
            || permission.roles.iter().any(|r| closure.contains(&normalize(r)))
    }

    /// Whether the session holds the operation on the object.
    ///
    /// Grants to any ascendant of an activated role count, as do direct
    /// grants to the user. An unknown permission is simply not held.
    pub async fn check_access(&self, session: &Session, obj_name: &str, op_name: &str) -> Result<bool> {
        let now = self.ensure_live(session)?;
        let context_id = session.context_id.as_str();

        let Some(permission) = self
            .core
            .directory
            .read_permission(context_id, obj_name, op_name, false)
            .await?
        else {
            SecurityLogger::log_authz_event(context_id, &session.user_id, obj_name, op_name, false);
            return Ok(false);
        };

        let closure = self.role_closure(session, now).await?;
        let granted = Self::reachable(&permission, &closure, &session.user_id);

        SecurityLogger::log_authz_event(context_id, &session.user_id, obj_name, op_name, granted);
        Ok(granted)
    }

    /// Every permission the session holds
    pub async fn session_permissions(&self, session: &Session) -> Result<Vec<Permission>> {
        let now = self.ensure_live(session)?;
        let closure = self.role_closure(session, now).await?;
        let permissions = self
            .core
            .directory
            .list_permissions(&session.context_id, false)
            .await?;

        Ok(permissions
            .into_iter()
            .filter(|p| Self::reachable(p, &closure, &session.user_id))
            .collect())
    }

    /// Activated roles
    pub fn session_roles<'a>(&self, session: &'a Session) -> Result<&'a [ActiveRole]> {
        self.ensure_live(session)?;
        Ok(session.roles())
    }

    /// Activated roles and everything they inherit
    pub async fn authorized_roles(&self, session: &Session) -> Result<BTreeSet<String>> {
        let now = self.ensure_live(session)?;
        let live = Self::live_role_names(session, now);
        self.core
            .roles
            .read(&self.core.directory, &session.context_id, |graph| {
                let mut names = BTreeSet::new();
                for role in &live {
                    match graph.ascendants(role) {
                        Ok(closure) => names.extend(closure),
                        Err(_) => {
                            names.insert(role.clone());
                        }
                    }
                }
                names
            })
            .await
    }

    /// The session's user, without credential material
    pub async fn session_user(&self, session: &Session) -> Result<User> {
        self.ensure_live(session)?;
        let mut user = self
            .core
            .directory
            .require_user(&session.context_id, &session.user_id)
            .await?;
        user.password_hash = None;
        user.auth_state.history.clear();
        Ok(user)
    }

    /// Refresh the idle timer
    pub fn touch(&self, session: &mut Session) -> Result<()> {
        let now = self.ensure_live(session)?;
        session.last_access = now;
        Ok(())
    }

    /// Activate another assigned role, under the same constraint and DSD
    /// rules as session creation
    pub async fn add_active_role(&self, session: &mut Session, role: &str) -> Result<()> {
        let now = self.ensure_live(session)?;
        let context_id = session.context_id.clone();

        if session.has_role(role) {
            return Err(RbacError::already_exists(format!(
                "Role '{}' is already active",
                role
            )));
        }

        let user = self
            .core
            .directory
            .require_user(&context_id, &session.user_id)
            .await?;
        let assignment = user.role(role).cloned().ok_or_else(|| {
            RbacError::role_not_assigned(format!("Role '{}' is not assigned to the user", role))
        })?;
        let role_constraint = self.role_constraint(&context_id, GraphKind::Rbac, role).await?;
        activation::admit(
            ActivationMode::Explicit,
            &assignment.name,
            &assignment.constraint,
            &role_constraint,
            now,
        )?;

        let existing = session.role_names();
        self.core
            .check_dsd(&context_id, std::slice::from_ref(&assignment.name), &existing)
            .await?;

        info!(context_id, user_id = %session.user_id, role = %assignment.name, "Role activated");
        session.roles.push(ActiveRole {
            name: assignment.name,
            assignment: assignment.constraint,
            role: role_constraint,
        });
        session.last_access = now;
        self.refresh_timers(session);
        Ok(())
    }

    /// Deactivate a role
    pub fn drop_active_role(&self, session: &mut Session, role: &str) -> Result<()> {
        let now = self.ensure_live(session)?;
        let key = normalize(role);
        let before = session.roles.len();
        session.roles.retain(|r| normalize(&r.name) != key);
        if session.roles.len() == before {
            return Err(RbacError::role_not_assigned(format!(
                "Role '{}' is not active in the session",
                role
            )));
        }

        info!(context_id = %session.context_id, user_id = %session.user_id, role, "Role deactivated");
        session.last_access = now;
        self.refresh_timers(session);
        Ok(())
    }

    /// End the session
    pub fn logout(&self, session: Session) {
        SecurityLogger::log_auth_event("logout", &session.context_id, &session.user_id, true, None);
    }
}
