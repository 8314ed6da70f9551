//! Engine facade wiring the managers to one set of collaborators

use crate::config::{DirectoryBackend, EngineConfig};
use crate::core::access::{AccessManager, DelegatedAccessManager, SessionRequest};
use crate::core::admin::AdminManager;
use crate::core::models::{Permission, Session};
use crate::core::pwpolicy::PwPolicyManager;
use crate::core::review::ReviewManager;
use crate::core::shared::EngineCore;
use crate::directory::{CredentialBinder, Directory, DirectoryStore, InMemoryDirectory};
use crate::utils::clock::{SharedClock, SystemClock};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// RBAC/ARBAC authorization engine.
///
/// Cheap to clone; clones share role graph caches, per-user locks and
/// collaborators. Every operation takes the context (tenant) identifier
/// that scopes its directory lookups.
#[derive(Clone, Debug)]
pub struct RbacEngine {
    core: EngineCore,
    access: AccessManager,
    admin: AdminManager,
    policies: PwPolicyManager,
    review: ReviewManager,
    delegated: DelegatedAccessManager,
}

impl RbacEngine {
    /// Create an engine over the backend named in the configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        match config.directory.backend {
            DirectoryBackend::Memory => {
                let memory = Arc::new(InMemoryDirectory::new());
                Self::with_directory(config, memory.clone(), memory)
            }
        }
    }

    /// Create an engine over host-provided collaborators
    pub fn with_directory(
        config: EngineConfig,
        store: Arc<dyn DirectoryStore>,
        binder: Arc<dyn CredentialBinder>,
    ) -> Result<Self> {
        config.validate()?;
        let directory = Directory::new(store, binder, config.directory.timeout());
        info!(
            backend = ?config.directory.backend,
            timeout_ms = config.directory.timeout_ms,
            "Creating authorization engine"
        );
        let clock: SharedClock = Arc::new(SystemClock);
        Ok(Self::from_core(EngineCore::new(directory, clock, config)))
    }

    /// Replace the time source
    pub fn with_clock(self, clock: SharedClock) -> Self {
        Self::from_core(self.core.with_clock(clock))
    }

    fn from_core(core: EngineCore) -> Self {
        Self {
            access: AccessManager::new(core.clone()),
            admin: AdminManager::new(core.clone()),
            policies: PwPolicyManager::new(core.clone()),
            review: ReviewManager::new(core.clone()),
            delegated: DelegatedAccessManager::new(core.clone()),
            core,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.core.config
    }

    /// Sessions and permission checks
    pub fn access(&self) -> &AccessManager {
        &self.access
    }

    /// Administrative mutations
    pub fn admin(&self) -> &AdminManager {
        &self.admin
    }

    /// Password policy administration
    pub fn policies(&self) -> &PwPolicyManager {
        &self.policies
    }

    /// Review queries
    pub fn review(&self) -> &ReviewManager {
        &self.review
    }

    /// ARBAC checks for administrative sessions
    pub fn delegated(&self) -> &DelegatedAccessManager {
        &self.delegated
    }

    /// Drop cached role graphs so they are reloaded from the directory.
    ///
    /// Needed only when the directory is edited behind the engine's back.
    pub fn invalidate_graphs(&self, context_id: &str) {
        self.core.roles.invalidate(context_id);
        self.core.admin_roles.invalidate(context_id);
    }

    pub async fn create_session(&self, context_id: &str, request: SessionRequest) -> Result<Session> {
        self.access.create_session(context_id, request).await
    }

    pub async fn check_access(&self, session: &Session, obj_name: &str, op_name: &str) -> Result<bool> {
        self.access.check_access(session, obj_name, op_name).await
    }

    pub async fn session_permissions(&self, session: &Session) -> Result<Vec<Permission>> {
        self.access.session_permissions(session).await
    }
}
