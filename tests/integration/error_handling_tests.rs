//! Error kinds surfaced to hosts and directory failure handling

#[cfg(test)]
mod tests {
    use crate::common::fixtures::CTX;
    use crate::common::{ResultAssertions, TestEngine};
    use rbac_engine::core::models::Role;
    use rbac_engine::directory::DirectoryStore;
    use rbac_engine::{EngineConfig, ErrorKind};
    use std::time::Duration;

    #[test]
    fn test_stable_identifiers() {
        assert_eq!(ErrorKind::InvalidCredential.as_str(), "invalid_credential");
        assert_eq!(ErrorKind::InvalidCredential.code(), 1001);
        assert_eq!(ErrorKind::CycleDetected.as_str(), "cycle_detected");
        assert_eq!(ErrorKind::SessionExpired.code(), 6001);
        assert_eq!(ErrorKind::DirectoryTimeout.as_str(), "directory_timeout");
        assert!(ErrorKind::DirectoryTimeout.is_transient());
        assert!(!ErrorKind::AccountLocked.is_transient());
    }

    #[tokio::test]
    async fn test_login_failures() {
        let env = TestEngine::bank().await;
        env.login("nobody").await.assert_kind(ErrorKind::UserNotFound);
        env.login_with("ursula", "wrong").await.assert_kind(ErrorKind::InvalidCredential);
    }

    #[tokio::test]
    async fn test_offline_directory_is_system_unavailable() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();

        env.memory.set_offline(true);
        env.login("ursula").await.assert_kind(ErrorKind::SystemUnavailable);
        env.engine
            .check_access(&session, "Account", "read")
            .await
            .assert_kind(ErrorKind::SystemUnavailable);
        env.engine
            .admin()
            .add_role(CTX, Role::new("Clerk"))
            .await
            .assert_kind(ErrorKind::SystemUnavailable);

        env.memory.set_offline(false);
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_slow_directory_times_out() {
        let mut config = EngineConfig::default();
        config.directory.timeout_ms = 50;
        let env = TestEngine::with_config(config);
        env.seed_bank().await;
        let session = env.login("ursula").await.unwrap();

        env.memory.set_latency(Some(Duration::from_millis(300)));
        let err = env
            .engine
            .check_access(&session, "Account", "read")
            .await
            .assert_kind(ErrorKind::DirectoryTimeout);
        assert!(err.kind().is_transient());

        env.memory.set_latency(None);
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_admin_write_leaves_graph_usable() {
        let env = TestEngine::bank().await;
        env.memory.set_offline(true);
        env.engine
            .admin()
            .add_inheritance(CTX, "Auditor", "Teller")
            .await
            .assert_kind(ErrorKind::SystemUnavailable);
        env.memory.set_offline(false);

        let session = env.login("ursula").await.unwrap();
        assert!(!env.engine.check_access(&session, "Ledger", "audit").await.unwrap());
        env.engine
            .admin()
            .add_inheritance(CTX, "Auditor", "Teller")
            .await
            .unwrap();
        assert!(env.engine.check_access(&session, "Ledger", "audit").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_reference_cleanup_keeps_role_intact() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();

        env.memory.fail_writes_after(Some(0));
        env.engine
            .admin()
            .delete_role(CTX, "Teller")
            .await
            .assert_kind(ErrorKind::SystemUnavailable);
        env.memory.fail_writes_after(None);

        let teller = env.memory.read_role(CTX, "Teller").await.unwrap().unwrap();
        assert!(teller.parents.contains("BranchStaff"));
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_role_delete_does_not_leave_stale_graph() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());

        // ursula's assignment and the BranchStaff edge go through, the HeadTeller edge fails
        env.memory.fail_writes_after(Some(2));
        env.engine
            .admin()
            .delete_role(CTX, "Teller")
            .await
            .assert_kind(ErrorKind::SystemUnavailable);
        env.memory.fail_writes_after(None);

        let teller = env.memory.read_role(CTX, "Teller").await.unwrap().unwrap();
        assert!(teller.parents.is_empty());

        let cached = env.engine.check_access(&session, "Account", "read").await.unwrap();
        env.engine.invalidate_graphs(CTX);
        let reloaded = env.engine.check_access(&session, "Account", "read").await.unwrap();
        assert!(!cached);
        assert_eq!(cached, reloaded);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let env = TestEngine::bank().await;
        env.engine
            .admin()
            .add_role(CTX, Role::new("   "))
            .await
            .assert_kind(ErrorKind::Validation);
        env.engine
            .admin()
            .add_role("", Role::new("Clerk"))
            .await
            .assert_kind(ErrorKind::Validation);
    }
}
