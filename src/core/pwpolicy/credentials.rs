//! Credential operations that mutate per-user authentication state.
//!
//! Each operation holds the user's lock, re-reads the user from the
//! directory, applies the transition and writes the user back. Failure
//! counters and locks are persisted even when the operation fails.

use super::change::{self, Initiator};
use super::state::{self, AuthOutcome};
use crate::core::models::{AccountLock, LockReason, PwPolicy, User};
use crate::core::shared::EngineCore;
use crate::utils::crypto::hash_password;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

impl EngineCore {
    /// Run the authentication transitions for `user_id`.
    ///
    /// Trusted callers skip credential verification and expiry, but a
    /// locked account or a pending reset still fails.
    pub(crate) async fn authenticate(
        &self,
        context_id: &str,
        user_id: &str,
        secret: Option<&str>,
        trusted: bool,
    ) -> Result<(User, AuthOutcome)> {
        let _guard = self.user_locks.acquire(context_id, user_id).await;
        let mut user = self.directory.require_user(context_id, user_id).await?;
        let policy = self.effective_policy(context_id, &user).await?;
        let now = self.now();
        let before = user.auth_state.clone();

        let result = self
            .run_authentication(context_id, &policy, &mut user, secret, trusted, now)
            .await;

        if user.auth_state != before {
            debug!(context_id, user_id, "Persisting authentication state");
            self.directory.write_user(context_id, &user).await?;
        }

        match &result {
            Ok(_) => {
                SecurityLogger::log_auth_event("create_session", context_id, user_id, true, None)
            }
            Err(e) => SecurityLogger::log_auth_event(
                "create_session",
                context_id,
                user_id,
                false,
                Some(e.kind().as_str()),
            ),
        }

        result.map(|outcome| (user, outcome))
    }

    async fn run_authentication(
        &self,
        context_id: &str,
        policy: &PwPolicy,
        user: &mut User,
        secret: Option<&str>,
        trusted: bool,
        now: DateTime<Utc>,
    ) -> Result<AuthOutcome> {
        if state::release_expired_lock(policy, &mut user.auth_state, now) {
            info!(context_id, user_id = %user.user_id, "Lockout period elapsed, account unlocked");
        }
        ensure_unlocked(policy, user)?;

        if trusted {
            return state::evaluate_trusted(user);
        }

        let secret = secret.ok_or_else(|| {
            RbacError::validation(format!("Credential required for user '{}'", user.user_id))
        })?;

        if !self.directory.bind(context_id, &user.user_id, secret).await? {
            let locked = state::record_failure(policy, &mut user.auth_state, now);
            if locked {
                SecurityLogger::log_security_violation(
                    "account_lockout",
                    context_id,
                    &user.user_id,
                    &format!(
                        "Account locked after {} consecutive failures",
                        user.auth_state.failure_count
                    ),
                );
            }
            return Err(RbacError::invalid_credential(format!(
                "Invalid credential for user '{}'",
                user.user_id
            )));
        }

        state::evaluate_success(policy, user, now)
    }

    /// User-initiated password change
    pub(crate) async fn change_password(
        &self,
        context_id: &str,
        user_id: &str,
        current: Option<&str>,
        new_secret: &str,
    ) -> Result<()> {
        let _guard = self.user_locks.acquire(context_id, user_id).await;
        let mut user = self.directory.require_user(context_id, user_id).await?;
        let policy = self.effective_policy(context_id, &user).await?;
        let now = self.now();

        if state::release_expired_lock(&policy, &mut user.auth_state, now) {
            self.directory.write_user(context_id, &user).await?;
        }
        ensure_unlocked(&policy, &user)?;

        change::check_user_rules(&policy, &user, current.is_some(), now)?;
        if let Some(current) = current {
            if !self.directory.bind(context_id, &user.user_id, current).await? {
                return Err(RbacError::invalid_credential(format!(
                    "Current password of user '{}' is incorrect",
                    user.user_id
                )));
            }
        }
        change::check_new_secret(&policy, &user, new_secret)?;

        let hash = hash_password(new_secret)?;
        change::apply_change(&policy, &mut user, hash, Initiator::User, now);
        self.directory.write_user(context_id, &user).await?;

        SecurityLogger::log_auth_event("change_password", context_id, user_id, true, None);
        Ok(())
    }

    /// Administrative password reset; bypasses minimum age and user-change
    /// rules and leaves locks in place
    pub(crate) async fn reset_password(
        &self,
        context_id: &str,
        user_id: &str,
        new_secret: &str,
    ) -> Result<()> {
        let _guard = self.user_locks.acquire(context_id, user_id).await;
        let mut user = self.directory.require_user(context_id, user_id).await?;
        let policy = self.effective_policy(context_id, &user).await?;
        let now = self.now();

        change::check_new_secret(&policy, &user, new_secret)?;

        let hash = hash_password(new_secret)?;
        change::apply_change(&policy, &mut user, hash, Initiator::Admin, now);
        self.directory.write_user(context_id, &user).await?;

        SecurityLogger::log_admin_event(context_id, "reset_password", user_id);
        Ok(())
    }

    pub(crate) async fn lock_account(&self, context_id: &str, user_id: &str) -> Result<()> {
        let _guard = self.user_locks.acquire(context_id, user_id).await;
        let mut user = self.directory.require_user(context_id, user_id).await?;

        user.auth_state.lock = Some(AccountLock {
            locked_at: self.now(),
            reason: LockReason::Administrative,
        });
        self.directory.write_user(context_id, &user).await?;

        SecurityLogger::log_admin_event(context_id, "lock_account", user_id);
        Ok(())
    }

    pub(crate) async fn unlock_account(&self, context_id: &str, user_id: &str) -> Result<()> {
        let _guard = self.user_locks.acquire(context_id, user_id).await;
        let mut user = self.directory.require_user(context_id, user_id).await?;

        if user.auth_state.lock.is_none() && user.auth_state.failure_count == 0 {
            warn!(context_id, user_id, "Unlock requested for an account that is not locked");
        }
        user.auth_state.lock = None;
        user.auth_state.reset_failures();
        self.directory.write_user(context_id, &user).await?;

        SecurityLogger::log_admin_event(context_id, "unlock_account", user_id);
        Ok(())
    }
}

fn ensure_unlocked(policy: &PwPolicy, user: &User) -> Result<()> {
    match &user.auth_state.lock {
        None => Ok(()),
        Some(lock) => {
            let detail = match state::lock_expiry(policy, lock) {
                Some(until) => format!("User '{}' is locked until {}", user.user_id, until),
                None => format!("User '{}' is locked", user.user_id),
            };
            Err(RbacError::account_locked(detail))
        }
    }
}
