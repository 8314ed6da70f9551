//! User records and per-user authentication state

use super::Constraint;
use crate::utils::validation::same_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A role assignment with its per-assignment constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    /// Assigned role name
    pub name: String,
    /// Validity of this particular assignment
    #[serde(default)]
    pub constraint: Constraint,
}

impl UserRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: Constraint::default(),
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Why an account is locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    /// Locked by an administrator; only an administrator unlocks it
    Administrative,
    /// Locked after too many consecutive failures
    FailureLimit,
}

/// An account lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLock {
    pub locked_at: DateTime<Utc>,
    pub reason: LockReason,
}

/// Mutable authentication state driven by the password policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// Consecutive failures in the current counting window
    #[serde(default)]
    pub failure_count: u32,
    /// First failure of the current counting window
    #[serde(default)]
    pub first_failure_at: Option<DateTime<Utc>>,
    /// Most recent failure
    #[serde(default)]
    pub last_failure_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lock: Option<AccountLock>,
    /// Grace logins consumed since the password expired
    #[serde(default)]
    pub grace_used: u32,
    /// When the current password was set
    #[serde(default)]
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Previous password hashes, newest last
    #[serde(default)]
    pub history: VecDeque<String>,
}

impl AuthState {
    /// Forget the current failure window
    pub fn reset_failures(&mut self) {
        self.failure_count = 0;
        self.first_failure_at = None;
        self.last_failure_at = None;
    }
}

/// A user entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id (case-insensitive)
    pub user_id: String,
    /// Argon2 PHC hash of the current secret
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Organizational unit
    #[serde(default)]
    pub ou: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// RBAC role assignments
    #[serde(default)]
    pub roles: Vec<UserRole>,
    /// ARBAC admin role assignments
    #[serde(default)]
    pub admin_roles: Vec<UserRole>,
    /// Bound password policy name
    #[serde(default)]
    pub pw_policy: Option<String>,
    /// Set by an administrative reset; cleared by a user change
    #[serde(default)]
    pub reset_required: bool,
    #[serde(default)]
    pub auth_state: AuthState,
}

impl User {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password_hash: None,
            ou: None,
            description: None,
            roles: Vec::new(),
            admin_roles: Vec::new(),
            pw_policy: None,
            reset_required: false,
            auth_state: AuthState::default(),
        }
    }

    pub fn with_ou(mut self, ou: impl Into<String>) -> Self {
        self.ou = Some(ou.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.pw_policy = Some(policy.into());
        self
    }

    /// Assignment of `role`, if any
    pub fn role(&self, role: &str) -> Option<&UserRole> {
        self.roles.iter().find(|r| same_name(&r.name, role))
    }

    /// Admin assignment of `role`, if any
    pub fn admin_role(&self, role: &str) -> Option<&UserRole> {
        self.admin_roles.iter().find(|r| same_name(&r.name, role))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role(role).is_some()
    }

    pub fn has_admin_role(&self, role: &str) -> bool {
        self.admin_role(role).is_some()
    }

    /// Assigned RBAC role names
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    pub fn is_locked(&self) -> bool {
        self.auth_state.lock.is_some()
    }
}
