//! Password change rules

use crate::core::models::{PwPolicy, User};
use crate::utils::clock::seconds;
use crate::utils::crypto::verify_password;
use crate::utils::error::{RbacError, Result};
use chrono::{DateTime, Utc};

/// Who is changing the password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    /// The user, optionally proving the current password
    User,
    /// An administrative reset
    Admin,
}

/// Rules that only apply to user-initiated changes: allow-user-change,
/// safe-modify and minimum age.
///
/// The current password itself is verified by the caller through the
/// directory bind.
pub fn check_user_rules(
    policy: &PwPolicy,
    user: &User,
    current_supplied: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    if !policy.allow_user_change {
        return Err(RbacError::modification_not_allowed(format!(
            "Policy '{}' does not allow users to change their password",
            policy.name
        )));
    }

    if policy.safe_modify && !current_supplied {
        return Err(RbacError::modification_not_allowed(format!(
            "Policy '{}' requires the current password",
            policy.name
        )));
    }

    if policy.min_age > 0 {
        if let Some(changed) = user.auth_state.password_changed_at {
            if now - changed < seconds(policy.min_age) {
                return Err(RbacError::constraint_violation(format!(
                    "Password of user '{}' is younger than the minimum age of {} seconds",
                    user.user_id, policy.min_age
                )));
            }
        }
    }

    Ok(())
}

/// Length and history rules, applied to every change
pub fn check_new_secret(policy: &PwPolicy, user: &User, new_secret: &str) -> Result<()> {
    let length = new_secret.chars().count();
    if length < policy.min_length as usize {
        return Err(RbacError::constraint_violation(format!(
            "Password is shorter than the minimum length of {}",
            policy.min_length
        )));
    }

    if policy.in_history > 0 && in_history(policy, user, new_secret)? {
        return Err(RbacError::constraint_violation(format!(
            "Password matches one of the last {} passwords",
            policy.in_history
        )));
    }

    Ok(())
}

fn in_history(policy: &PwPolicy, user: &User, secret: &str) -> Result<bool> {
    let recent = user
        .auth_state
        .history
        .iter()
        .rev()
        .take(policy.in_history as usize);

    for hash in user.password_hash.iter().chain(recent) {
        if verify_password(secret, hash)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Install `new_hash` as the user's password
pub fn apply_change(
    policy: &PwPolicy,
    user: &mut User,
    new_hash: String,
    initiator: Initiator,
    now: DateTime<Utc>,
) {
    let state = &mut user.auth_state;
    if let Some(old) = user.password_hash.replace(new_hash) {
        state.history.push_back(old);
    }
    while state.history.len() > policy.in_history as usize {
        state.history.pop_front();
    }

    state.password_changed_at = Some(now);
    state.grace_used = 0;
    user.reset_required = match initiator {
        Initiator::User => false,
        Initiator::Admin => policy.must_change,
    };
}
