//! Authentication-time policy transitions

use crate::core::models::{AccountLock, AuthState, LockReason, PwPolicy, User};
use crate::utils::clock::seconds;
use crate::utils::error::{RbacError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable policy state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PolicyState {
    Active,
    /// `until: None` means until an administrator unlocks it
    Locked { until: Option<DateTime<Utc>> },
    MustChange,
    ExpiredGrace { remaining: u32 },
    ExpiredNoGrace,
}

/// Result of a successful credential check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Seconds until expiry when inside the warning window, otherwise 0
    pub expiration_seconds: i64,
    /// Set when the login consumed a grace login
    pub grace_logins_remaining: Option<u32>,
}

/// When a lock ends; `None` for indefinite locks
pub fn lock_expiry(policy: &PwPolicy, lock: &AccountLock) -> Option<DateTime<Utc>> {
    match lock.reason {
        LockReason::Administrative => None,
        LockReason::FailureLimit if policy.lockout_duration == 0 => None,
        LockReason::FailureLimit => Some(lock.locked_at + seconds(policy.lockout_duration)),
    }
}

/// Seconds the current password has been in use
fn password_age(state: &AuthState, now: DateTime<Utc>) -> Option<i64> {
    state
        .password_changed_at
        .map(|changed| (now - changed).num_seconds().max(0))
}

fn is_expired(policy: &PwPolicy, state: &AuthState, now: DateTime<Utc>) -> bool {
    policy.max_age > 0
        && password_age(state, now).is_some_and(|age| age > policy.max_age as i64)
}

/// Policy state of `user` at `now`, without side effects
pub fn password_state(policy: &PwPolicy, user: &User, now: DateTime<Utc>) -> PolicyState {
    if let Some(lock) = &user.auth_state.lock {
        let until = lock_expiry(policy, lock);
        if until.is_none_or(|until| now < until) {
            return PolicyState::Locked { until };
        }
    }
    if user.reset_required {
        return PolicyState::MustChange;
    }
    if is_expired(policy, &user.auth_state, now) {
        let remaining = policy
            .grace_login_limit
            .saturating_sub(user.auth_state.grace_used);
        return if remaining > 0 {
            PolicyState::ExpiredGrace { remaining }
        } else {
            PolicyState::ExpiredNoGrace
        };
    }
    PolicyState::Active
}

/// Clear a failure lock whose duration has elapsed.
///
/// Administrative locks and zero-duration failure locks never expire.
pub fn release_expired_lock(policy: &PwPolicy, state: &mut AuthState, now: DateTime<Utc>) -> bool {
    let Some(lock) = &state.lock else {
        return false;
    };
    match lock_expiry(policy, lock) {
        Some(until) if now >= until => {
            state.lock = None;
            state.reset_failures();
            true
        }
        _ => false,
    }
}

/// Count a failed credential check; returns whether the account is now locked.
///
/// With a failure-count interval, a failure arriving after the window has
/// elapsed starts a new window instead of accumulating.
pub fn record_failure(policy: &PwPolicy, state: &mut AuthState, now: DateTime<Utc>) -> bool {
    let window_elapsed = policy.failure_count_interval > 0
        && state
            .first_failure_at
            .is_some_and(|first| now - first > seconds(policy.failure_count_interval));

    if window_elapsed || state.first_failure_at.is_none() {
        state.failure_count = 1;
        state.first_failure_at = Some(now);
    } else {
        state.failure_count = state.failure_count.saturating_add(1);
    }
    state.last_failure_at = Some(now);

    if policy.lockout && policy.max_failure > 0 && state.failure_count >= policy.max_failure {
        state.lock = Some(AccountLock {
            locked_at: now,
            reason: LockReason::FailureLimit,
        });
        return true;
    }
    false
}

/// Apply the post-verification rules for a correct credential.
///
/// Checked in order: pending reset, expiry with grace logins, warning window.
/// A pending reset is reported before expiry and consumes no grace login.
pub fn evaluate_success(policy: &PwPolicy, user: &mut User, now: DateTime<Utc>) -> Result<AuthOutcome> {
    if user.reset_required {
        user.auth_state.reset_failures();
        return Err(RbacError::must_reset(format!(
            "User '{}' must change their password",
            user.user_id
        )));
    }

    if is_expired(policy, &user.auth_state, now) {
        user.auth_state.reset_failures();
        if policy.grace_login_limit > 0 && user.auth_state.grace_used < policy.grace_login_limit {
            user.auth_state.grace_used += 1;
            return Ok(AuthOutcome {
                expiration_seconds: 0,
                grace_logins_remaining: Some(policy.grace_login_limit - user.auth_state.grace_used),
            });
        }
        return Err(RbacError::password_expired(format!(
            "Password of user '{}' has expired",
            user.user_id
        )));
    }

    let mut outcome = AuthOutcome::default();
    if policy.max_age > 0 && policy.expire_warning > 0 {
        if let Some(age) = password_age(&user.auth_state, now) {
            let remaining = policy.max_age as i64 - age;
            if remaining <= policy.expire_warning as i64 {
                outcome.expiration_seconds = remaining.max(1);
            }
        }
    }

    user.auth_state.reset_failures();
    user.auth_state.grace_used = 0;
    Ok(outcome)
}

/// Rules for a trusted session: no credential was verified, so failure
/// counters are left alone and expiry is not evaluated
pub fn evaluate_trusted(user: &User) -> Result<AuthOutcome> {
    if user.reset_required {
        return Err(RbacError::must_reset(format!(
            "User '{}' must change their password",
            user.user_id
        )));
    }
    Ok(AuthOutcome::default())
}
