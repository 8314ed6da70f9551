//! Password policy administration

use super::state::{self, PolicyState};
use crate::core::models::{PwPolicy, PwPolicyUpdate};
use crate::core::shared::EngineCore;
use crate::directory::UserFilter;
use crate::utils::error::{RbacError, Result};
use crate::utils::logging::SecurityLogger;
use crate::utils::validation::{normalize, same_name, validate_context_id, validate_name};
use tracing::info;

/// Check the relationships between policy parameters
pub fn validate_policy(policy: &PwPolicy) -> Result<()> {
    validate_name("policy name", &policy.name)?;

    if policy.max_age > 0 && policy.max_age < policy.min_age {
        return Err(RbacError::validation(format!(
            "max_age ({}) must not be less than min_age ({})",
            policy.max_age, policy.min_age
        )));
    }
    if policy.expire_warning > 0 && policy.expire_warning >= policy.max_age {
        return Err(RbacError::validation(format!(
            "expire_warning ({}) must be less than max_age ({})",
            policy.expire_warning, policy.max_age
        )));
    }
    if policy.check_quality > 2 {
        return Err(RbacError::validation(format!(
            "check_quality must be 0, 1 or 2, got {}",
            policy.check_quality
        )));
    }
    if policy.attribute.trim().is_empty() {
        return Err(RbacError::validation("attribute must not be empty"));
    }
    Ok(())
}

/// Password policy CRUD and policy binding for users
#[derive(Clone, Debug)]
pub struct PwPolicyManager {
    core: EngineCore,
}

impl PwPolicyManager {
    pub(crate) fn new(core: EngineCore) -> Self {
        Self { core }
    }

    pub async fn add(&self, context_id: &str, policy: PwPolicy) -> Result<PwPolicy> {
        validate_context_id(context_id)?;
        validate_policy(&policy)?;

        let directory = &self.core.directory;
        if directory.read_policy(context_id, &policy.name).await?.is_some() {
            return Err(RbacError::already_exists(format!(
                "Policy '{}' already exists",
                policy.name
            )));
        }
        directory.write_policy(context_id, &policy).await?;

        SecurityLogger::log_admin_event(context_id, "add_policy", &policy.name);
        Ok(policy)
    }

    /// Apply the fields present in `update`
    pub async fn update(
        &self,
        context_id: &str,
        name: &str,
        update: PwPolicyUpdate,
    ) -> Result<PwPolicy> {
        let directory = &self.core.directory;
        let mut policy = directory.require_policy(context_id, name).await?;
        update.apply_to(&mut policy);
        validate_policy(&policy)?;

        directory.write_policy(context_id, &policy).await?;
        SecurityLogger::log_admin_event(context_id, "update_policy", &policy.name);
        Ok(policy)
    }

    /// Delete a policy; users bound to it fall back to the default policy.
    ///
    /// The configured default policy cannot be deleted while it is in
    /// force, since every unbound user resolves to it.
    pub async fn delete(&self, context_id: &str, name: &str) -> Result<()> {
        let directory = &self.core.directory;
        let policy = directory.require_policy(context_id, name).await?;
        if self
            .core
            .config
            .password
            .default_policy
            .as_deref()
            .is_some_and(|default| same_name(default, &policy.name))
        {
            return Err(RbacError::modification_not_allowed(format!(
                "Policy '{}' is the configured default policy",
                policy.name
            )));
        }
        directory.delete_policy(context_id, name).await?;

        SecurityLogger::log_admin_event(context_id, "delete_policy", name);
        Ok(())
    }

    pub async fn read(&self, context_id: &str, name: &str) -> Result<PwPolicy> {
        self.core.directory.require_policy(context_id, name).await
    }

    /// Policies whose name starts with `prefix` (case-insensitive)
    pub async fn search(&self, context_id: &str, prefix: &str) -> Result<Vec<PwPolicy>> {
        let prefix = normalize(prefix);
        let policies = self.core.directory.list_policies(context_id).await?;
        Ok(policies
            .into_iter()
            .filter(|p| normalize(&p.name).starts_with(&prefix))
            .collect())
    }

    /// Bind `user_id` to the policy `name`
    pub async fn update_user_policy(&self, context_id: &str, user_id: &str, name: &str) -> Result<()> {
        let directory = &self.core.directory;
        let policy = directory.require_policy(context_id, name).await?;

        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        user.pw_policy = Some(policy.name);
        directory.write_user(context_id, &user).await?;

        info!(context_id, user_id, policy = name, "Bound password policy");
        Ok(())
    }

    /// Unbind `user_id` from its policy
    pub async fn delete_user_policy(&self, context_id: &str, user_id: &str) -> Result<()> {
        let directory = &self.core.directory;
        let _guard = self.core.user_locks.acquire(context_id, user_id).await;
        let mut user = directory.require_user(context_id, user_id).await?;
        user.pw_policy = None;
        directory.write_user(context_id, &user).await?;

        info!(context_id, user_id, "Unbound password policy");
        Ok(())
    }

    /// Users bound to the policy `name`
    pub async fn policy_users(&self, context_id: &str, name: &str) -> Result<Vec<String>> {
        let users = self
            .core
            .directory
            .search_users(context_id, &UserFilter::with_policy(name))
            .await?;
        Ok(users.into_iter().map(|u| u.user_id).collect())
    }

    /// Current policy state of `user_id`
    pub async fn password_state(&self, context_id: &str, user_id: &str) -> Result<PolicyState> {
        let user = self.core.directory.require_user(context_id, user_id).await?;
        let policy = self.core.effective_policy(context_id, &user).await?;
        Ok(state::password_state(&policy, &user, self.core.now()))
    }
}
