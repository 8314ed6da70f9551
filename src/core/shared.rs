//! State shared by every manager of one engine instance

use super::hierarchy::{GraphKind, HierarchyResolver};
use super::locks::UserLocks;
use super::models::{PwPolicy, User};
use crate::config::EngineConfig;
use crate::directory::Directory;
use crate::utils::clock::SharedClock;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Handles shared by the access, administration, review and policy managers.
///
/// Cloning is cheap; all clones observe the same graphs and locks.
#[derive(Clone, Debug)]
pub struct EngineCore {
    pub(crate) directory: Arc<Directory>,
    pub(crate) roles: Arc<HierarchyResolver>,
    pub(crate) admin_roles: Arc<HierarchyResolver>,
    pub(crate) user_locks: Arc<UserLocks>,
    pub(crate) clock: SharedClock,
    pub(crate) config: Arc<EngineConfig>,
}

impl EngineCore {
    pub fn new(directory: Directory, clock: SharedClock, config: EngineConfig) -> Self {
        Self {
            directory: Arc::new(directory),
            roles: Arc::new(HierarchyResolver::new(GraphKind::Rbac)),
            admin_roles: Arc::new(HierarchyResolver::new(GraphKind::Arbac)),
            user_locks: Arc::new(UserLocks::new()),
            clock,
            config: Arc::new(config),
        }
    }

    /// Same collaborators and caches, different time source
    pub(crate) fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Resolver for the requested role space
    pub(crate) fn resolver(&self, kind: GraphKind) -> &HierarchyResolver {
        match kind {
            GraphKind::Rbac => &self.roles,
            GraphKind::Arbac => &self.admin_roles,
        }
    }

    /// Policy governing `user`: the bound policy, else the configured
    /// default, else an unrestricted policy
    pub(crate) async fn effective_policy(&self, context_id: &str, user: &User) -> Result<PwPolicy> {
        let name = user
            .pw_policy
            .as_deref()
            .or(self.config.password.default_policy.as_deref());

        match name {
            Some(name) => self.directory.require_policy(context_id, name).await,
            None => Ok(PwPolicy::default()),
        }
    }
}
