//! Fixtures shared by the core unit tests

use super::models::{Permission, Role, User, UserRole};
use super::shared::EngineCore;
use crate::config::EngineConfig;
use crate::directory::{Directory, DirectoryStore, InMemoryDirectory};
use crate::utils::clock::ManualClock;
use crate::utils::crypto::hash_password;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const CTX: &str = "acme";
pub(crate) const SECRET: &str = "Correct-Horse-1";

/// Saturday 2024-06-01 10:00 UTC
pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

pub(crate) struct Fixture {
    pub memory: Arc<InMemoryDirectory>,
    pub clock: ManualClock,
    pub core: EngineCore,
}

pub(crate) fn fixture_with(config: EngineConfig) -> Fixture {
    let memory = Arc::new(InMemoryDirectory::new());
    let clock = ManualClock::new(t0());
    let directory = Directory::new(memory.clone(), memory.clone(), Duration::from_secs(1));
    let core = EngineCore::new(directory, Arc::new(clock.clone()), config);
    Fixture {
        memory,
        clock,
        core,
    }
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(EngineConfig::default())
}

impl Fixture {
    pub async fn role(&self, name: &str, parents: &[&str]) {
        let mut role = Role::new(name);
        role.parents = parents.iter().map(|p| p.to_string()).collect();
        self.memory.write_role(CTX, &role).await.unwrap();
    }

    pub async fn user(&self, user_id: &str, roles: &[&str]) -> User {
        let mut user = User::new(user_id);
        user.password_hash = Some(hash_password(SECRET).unwrap());
        user.auth_state.password_changed_at = Some(t0());
        user.roles = roles.iter().map(|r| UserRole::new(*r)).collect();
        self.memory.write_user(CTX, &user).await.unwrap();
        user
    }

    pub async fn grant(&self, obj: &str, op: &str, roles: &[&str]) {
        let mut permission = Permission::new(obj, op);
        permission.roles = roles.iter().map(|r| r.to_string()).collect();
        self.memory.write_permission(CTX, &permission).await.unwrap();
    }

    /// Teller inherits BranchStaff; Auditor stands alone
    pub async fn bank(&self) {
        self.role("BranchStaff", &[]).await;
        self.role("Teller", &["BranchStaff"]).await;
        self.role("Auditor", &[]).await;
        self.grant("Account", "read", &["BranchStaff"]).await;
        self.grant("Ledger", "audit", &["Auditor"]).await;
    }
}
