//! Sessions: an authenticated user with a set of activated roles

use super::{Constraint, SessionClock};
use crate::utils::clock::seconds;
use crate::utils::validation::normalize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role made live in a session, with the constraints it was activated under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRole {
    pub name: String,
    /// Per-assignment constraint
    pub assignment: Constraint,
    /// The role's own validity window
    pub role: Constraint,
}

impl ActiveRole {
    pub(crate) fn key(&self) -> String {
        normalize(&self.name)
    }

    /// Tightest idle timeout across both constraints
    pub(crate) fn idle_timeout(&self) -> Option<u64> {
        min_opt(self.assignment.idle_timeout(), self.role.idle_timeout())
    }

    /// Tightest absolute duration across both constraints
    pub(crate) fn max_duration(&self) -> Option<u64> {
        min_opt(self.assignment.max_duration(), self.role.max_duration())
    }
}

pub(crate) fn min_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// An authenticated session.
///
/// Owned by the caller that created it; the engine keeps no registry of live
/// sessions and checks expiry lazily on use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) id: Uuid,
    pub(crate) context_id: String,
    pub(crate) user_id: String,
    pub(crate) roles: Vec<ActiveRole>,
    pub(crate) admin_roles: Vec<ActiveRole>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_access: DateTime<Utc>,
    pub(crate) absolute_deadline: Option<DateTime<Utc>>,
    pub(crate) idle_timeout_secs: Option<u64>,
    pub(crate) expiration_seconds: i64,
    pub(crate) grace_logins_remaining: Option<u32>,
    pub(crate) trusted: bool,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Activated RBAC roles
    pub fn roles(&self) -> &[ActiveRole] {
        &self.roles
    }

    /// Activated ARBAC admin roles
    pub fn admin_roles(&self) -> &[ActiveRole] {
        &self.admin_roles
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    pub fn has_role(&self, role: &str) -> bool {
        let key = normalize(role);
        self.roles.iter().any(|r| r.key() == key)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_access(&self) -> DateTime<Utc> {
        self.last_access
    }

    /// Instant after which the session is dead regardless of activity
    pub fn absolute_deadline(&self) -> Option<DateTime<Utc>> {
        self.absolute_deadline
    }

    pub fn idle_timeout_secs(&self) -> Option<u64> {
        self.idle_timeout_secs
    }

    /// Seconds until the password expires when inside the warning window,
    /// otherwise 0
    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_seconds
    }

    /// Grace logins left when the session was created on an expired password
    pub fn grace_logins_remaining(&self) -> Option<u32> {
        self.grace_logins_remaining
    }

    /// Created without credential verification
    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    pub(crate) fn clock(&self) -> SessionClock {
        SessionClock {
            started_at: self.created_at,
            last_access: self.last_access,
        }
    }

    /// Whether either deadline has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.absolute_deadline.is_some_and(|deadline| now > deadline) {
            return true;
        }
        self.idle_timeout_secs
            .is_some_and(|secs| now - self.last_access > seconds(secs))
    }
}
