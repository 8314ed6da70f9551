//! Test fixtures and data factories
//!
//! Everything runs against the in-memory directory and a manual clock, so
//! time-based transitions are driven without sleeping.

use chrono::{DateTime, TimeZone, Utc};
use rbac_engine::core::models::{Permission, PwPolicy, Role, Session, User};
use rbac_engine::directory::InMemoryDirectory;
use rbac_engine::{EngineConfig, ManualClock, RbacEngine, Result, SessionRequest};
use std::sync::Arc;

pub const CTX: &str = "acme";
pub const SECRET: &str = "Correct-Horse-1";

/// Saturday 2024-06-01 10:00 UTC
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

/// Engine plus handles to drive its collaborators
pub struct TestEngine {
    pub engine: RbacEngine,
    pub clock: ManualClock,
    pub memory: Arc<InMemoryDirectory>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let memory = Arc::new(InMemoryDirectory::new());
        let clock = ManualClock::new(t0());
        let engine = RbacEngine::with_directory(config, memory.clone(), memory.clone())
            .unwrap()
            .with_clock(Arc::new(clock.clone()));
        Self {
            engine,
            clock,
            memory,
        }
    }

    /// Engine seeded with the branch model:
    ///
    /// ```text
    /// Employee <- BranchStaff <- Teller <- HeadTeller
    /// Employee <- Auditor
    /// ```
    ///
    /// `Account.read` is granted to BranchStaff, `Ledger.audit` to Auditor.
    /// User `ursula` is assigned Teller.
    pub async fn bank() -> Self {
        let env = Self::new();
        env.seed_bank().await;
        env
    }

    pub async fn seed_bank(&self) {
        let admin = self.engine.admin();
        for role in ["Employee", "BranchStaff", "Teller", "HeadTeller", "Auditor"] {
            admin.add_role(CTX, Role::new(role)).await.unwrap();
        }
        admin.add_inheritance(CTX, "Employee", "BranchStaff").await.unwrap();
        admin.add_inheritance(CTX, "BranchStaff", "Teller").await.unwrap();
        admin.add_inheritance(CTX, "Teller", "HeadTeller").await.unwrap();
        admin.add_inheritance(CTX, "Employee", "Auditor").await.unwrap();

        admin
            .add_permission(CTX, Permission::new("Account", "read").with_ou("Accounts"))
            .await
            .unwrap();
        admin.grant_permission(CTX, "Account", "read", "BranchStaff").await.unwrap();
        admin
            .add_permission(CTX, Permission::new("Ledger", "audit"))
            .await
            .unwrap();
        admin.grant_permission(CTX, "Ledger", "audit", "Auditor").await.unwrap();

        self.add_user("ursula", &["Teller"]).await;
    }

    /// Add a user holding `SECRET` and the given roles
    pub async fn add_user(&self, user_id: &str, roles: &[&str]) {
        let admin = self.engine.admin();
        admin
            .add_user(CTX, User::new(user_id).with_ou("Branch"), Some(SECRET))
            .await
            .unwrap();
        for role in roles {
            admin.assign_user(CTX, user_id, role, None).await.unwrap();
        }
    }

    /// Add a policy and bind `user_id` to it
    pub async fn bind_policy(&self, user_id: &str, policy: PwPolicy) {
        let name = policy.name.clone();
        self.engine.policies().add(CTX, policy).await.unwrap();
        self.engine
            .policies()
            .update_user_policy(CTX, user_id, &name)
            .await
            .unwrap();
    }

    pub async fn login(&self, user_id: &str) -> Result<Session> {
        self.login_with(user_id, SECRET).await
    }

    pub async fn login_with(&self, user_id: &str, secret: &str) -> Result<Session> {
        self.engine
            .create_session(CTX, SessionRequest::new(user_id, secret))
            .await
    }

    pub fn advance_secs(&self, secs: u64) {
        self.clock.advance_secs(secs);
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for password policies
pub struct PolicyFactory;

impl PolicyFactory {
    /// Lock after three failures for `duration` seconds (0 = until unlocked)
    pub fn lockout(duration: u64) -> PwPolicy {
        PwPolicy {
            lockout: true,
            max_failure: 3,
            lockout_duration: duration,
            ..PwPolicy::new("lockout")
        }
    }

    /// Expire after `max_age` seconds with `grace` grace logins
    pub fn expiring(max_age: u64, grace: u32) -> PwPolicy {
        PwPolicy {
            max_age,
            grace_login_limit: grace,
            ..PwPolicy::new("expiring")
        }
    }

    /// Minimum age, length and history rules
    pub fn strict() -> PwPolicy {
        PwPolicy {
            min_age: 3600,
            min_length: 10,
            in_history: 3,
            safe_modify: true,
            ..PwPolicy::new("strict")
        }
    }
}
