//! Password policy state machine tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{CTX, PolicyFactory, SECRET};
    use crate::common::{ResultAssertions, TestEngine};
    use rbac_engine::PolicyState;
    use rbac_engine::core::models::{PwPolicy, PwPolicyUpdate};
    use rbac_engine::directory::DirectoryStore;
    use futures::future::join_all;
    use rbac_engine::{EngineConfig, ErrorKind};

    #[tokio::test]
    async fn test_lockout_then_auto_unlock() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PolicyFactory::lockout(300)).await;

        for _ in 0..3 {
            env.login_with("ursula", "wrong").await.assert_kind(ErrorKind::InvalidCredential);
        }
        env.login("ursula").await.assert_kind(ErrorKind::AccountLocked);

        env.advance_secs(300);
        env.login("ursula").await.unwrap();

        let user = env.memory.read_user(CTX, "ursula").await.unwrap().unwrap();
        assert_eq!(user.auth_state.failure_count, 0);
        assert!(user.auth_state.lock.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_failures_are_all_counted() {
        let env = TestEngine::bank().await;
        env.bind_policy(
            "ursula",
            PwPolicy {
                lockout: true,
                max_failure: 10,
                ..PwPolicy::new("counting")
            },
        )
        .await;

        let attempts = (0..6).map(|_| env.login_with("ursula", "wrong"));
        for result in join_all(attempts).await {
            result.assert_kind(ErrorKind::InvalidCredential);
        }

        let user = env.memory.read_user(CTX, "ursula").await.unwrap().unwrap();
        assert_eq!(user.auth_state.failure_count, 6);
    }

    #[tokio::test]
    async fn test_indefinite_lock_needs_admin() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PolicyFactory::lockout(0)).await;

        for _ in 0..3 {
            let _ = env.login_with("ursula", "wrong").await;
        }
        env.advance_secs(86_400 * 365);
        env.login("ursula").await.assert_kind(ErrorKind::AccountLocked);
        assert_eq!(
            env.engine.policies().password_state(CTX, "ursula").await.unwrap(),
            PolicyState::Locked { until: None }
        );

        env.engine.admin().unlock_user_account(CTX, "ursula").await.unwrap();
        env.login("ursula").await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_are_persisted_when_session_fails() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PolicyFactory::lockout(300)).await;

        env.login_with("ursula", "wrong").await.unwrap_err();
        env.login_with("ursula", "wrong").await.unwrap_err();
        let user = env.memory.read_user(CTX, "ursula").await.unwrap().unwrap();
        assert_eq!(user.auth_state.failure_count, 2);

        env.login("ursula").await.unwrap();
        let user = env.memory.read_user(CTX, "ursula").await.unwrap().unwrap();
        assert_eq!(user.auth_state.failure_count, 0);
    }

    #[tokio::test]
    async fn test_failure_window_resets_lazily() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PwPolicy {
            failure_count_interval: 60,
            ..PolicyFactory::lockout(300)
        })
        .await;

        env.login_with("ursula", "wrong").await.unwrap_err();
        env.login_with("ursula", "wrong").await.unwrap_err();
        env.advance_secs(61);
        env.login_with("ursula", "wrong").await.unwrap_err();
        env.login("ursula").await.unwrap();
    }

    #[tokio::test]
    async fn test_grace_logins_then_expired() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PolicyFactory::expiring(3600, 2)).await;

        env.advance_secs(3601);
        let first = env.login("ursula").await.unwrap();
        assert_eq!(first.grace_logins_remaining(), Some(1));
        let second = env.login("ursula").await.unwrap();
        assert_eq!(second.grace_logins_remaining(), Some(0));
        env.login("ursula").await.assert_kind(ErrorKind::PasswordExpired);

        assert_eq!(
            env.engine.policies().password_state(CTX, "ursula").await.unwrap(),
            PolicyState::ExpiredNoGrace
        );
    }

    #[tokio::test]
    async fn test_expiration_warning() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PwPolicy {
            expire_warning: 600,
            ..PolicyFactory::expiring(3600, 0)
        })
        .await;

        assert_eq!(env.login("ursula").await.unwrap().expiration_seconds(), 0);
        env.advance_secs(3300);
        assert_eq!(env.login("ursula").await.unwrap().expiration_seconds(), 300);
    }

    #[tokio::test]
    async fn test_min_age_and_history() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PolicyFactory::strict()).await;
        let admin = env.engine.admin();

        // the fixture password was set at t0
        env.advance_secs(3600);
        admin
            .change_password(CTX, "ursula", Some(SECRET), "Second-Secret-2")
            .await
            .unwrap();
        admin
            .change_password(CTX, "ursula", Some("Second-Secret-2"), "Third-Secret-3")
            .await
            .assert_kind(ErrorKind::ConstraintViolation);

        env.advance_secs(3600);
        admin
            .change_password(CTX, "ursula", Some("Second-Secret-2"), SECRET)
            .await
            .assert_kind(ErrorKind::ConstraintViolation);
        admin
            .change_password(CTX, "ursula", Some("Second-Secret-2"), "short")
            .await
            .assert_kind(ErrorKind::ConstraintViolation);
        admin
            .change_password(CTX, "ursula", None, "Third-Secret-3")
            .await
            .assert_kind(ErrorKind::ModificationNotAllowed);
        admin
            .change_password(CTX, "ursula", Some("Wrong-Secret-9"), "Third-Secret-3")
            .await
            .assert_kind(ErrorKind::InvalidCredential);
        admin
            .change_password(CTX, "ursula", Some("Second-Secret-2"), "Third-Secret-3")
            .await
            .unwrap();

        env.login_with("ursula", "Third-Secret-3").await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_reset_forces_change() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PwPolicy {
            must_change: true,
            min_age: 3600,
            ..PwPolicy::new("forced")
        })
        .await;
        let admin = env.engine.admin();

        // reset bypasses the minimum age
        admin.reset_password(CTX, "ursula", "Temporary-1").await.unwrap();
        env.login_with("ursula", "Temporary-1")
            .await
            .assert_kind(ErrorKind::PasswordMustBeReset);
        assert_eq!(
            env.engine.policies().password_state(CTX, "ursula").await.unwrap(),
            PolicyState::MustChange
        );

        env.advance_secs(3600);
        admin
            .change_password(CTX, "ursula", Some("Temporary-1"), "Chosen-Secret-7")
            .await
            .unwrap();
        env.login_with("ursula", "Chosen-Secret-7").await.unwrap();
    }

    #[tokio::test]
    async fn test_user_change_not_allowed() {
        let env = TestEngine::bank().await;
        env.bind_policy("ursula", PwPolicy {
            allow_user_change: false,
            ..PwPolicy::new("locked-down")
        })
        .await;
        let admin = env.engine.admin();

        admin
            .change_password(CTX, "ursula", Some(SECRET), "Another-Secret-4")
            .await
            .assert_kind(ErrorKind::ModificationNotAllowed);
        admin.reset_password(CTX, "ursula", "Another-Secret-4").await.unwrap();
    }

    #[tokio::test]
    async fn test_default_policy_from_config() {
        let mut config = EngineConfig::default();
        config.password.default_policy = Some("lockout".to_string());
        let env = TestEngine::with_config(config);
        env.engine
            .policies()
            .add(CTX, PolicyFactory::lockout(300))
            .await
            .unwrap();
        env.seed_bank().await;

        for _ in 0..3 {
            let _ = env.login_with("ursula", "wrong").await;
        }
        env.login("ursula").await.assert_kind(ErrorKind::AccountLocked);
    }

    #[tokio::test]
    async fn test_configured_default_policy_cannot_be_deleted() {
        let mut config = EngineConfig::default();
        config.password.default_policy = Some("lockout".to_string());
        let env = TestEngine::with_config(config);
        let policies = env.engine.policies();
        policies.add(CTX, PolicyFactory::lockout(300)).await.unwrap();
        policies.add(CTX, PolicyFactory::strict()).await.unwrap();
        env.seed_bank().await;
        env.login("ursula").await.unwrap();

        policies
            .delete(CTX, "LOCKOUT")
            .await
            .assert_kind(ErrorKind::ModificationNotAllowed);
        policies.read(CTX, "lockout").await.unwrap();
        env.login("ursula").await.unwrap();
        env.engine
            .admin()
            .reset_password(CTX, "ursula", "Fresh-Secret-99")
            .await
            .unwrap();

        policies.delete(CTX, "strict").await.unwrap();
    }

    #[tokio::test]
    async fn test_policy_crud() {
        let env = TestEngine::bank().await;
        let policies = env.engine.policies();

        policies.add(CTX, PolicyFactory::strict()).await.unwrap();
        policies.add(CTX, PolicyFactory::lockout(60)).await.unwrap();
        policies
            .add(CTX, PolicyFactory::strict())
            .await
            .assert_kind(ErrorKind::AlreadyExists);
        policies
            .add(CTX, PwPolicy {
                max_age: 10,
                min_age: 20,
                ..PwPolicy::new("broken")
            })
            .await
            .assert_kind(ErrorKind::Validation);

        let updated = policies
            .update(CTX, "STRICT", PwPolicyUpdate {
                min_length: Some(16),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.min_length, 16);
        assert_eq!(updated.in_history, 3);

        assert_eq!(policies.search(CTX, "st").await.unwrap().len(), 1);
        assert_eq!(policies.search(CTX, "").await.unwrap().len(), 2);

        policies.update_user_policy(CTX, "ursula", "strict").await.unwrap();
        assert_eq!(policies.policy_users(CTX, "strict").await.unwrap(), vec!["ursula"]);

        policies.delete(CTX, "strict").await.unwrap();
        let user = env.memory.read_user(CTX, "ursula").await.unwrap().unwrap();
        assert!(user.pw_policy.is_none());
        policies.read(CTX, "strict").await.assert_kind(ErrorKind::PolicyNotFound);

        policies.update_user_policy(CTX, "ursula", "lockout").await.unwrap();
        policies.delete_user_policy(CTX, "ursula").await.unwrap();
        assert!(policies.policy_users(CTX, "lockout").await.unwrap().is_empty());
        policies
            .update_user_policy(CTX, "ursula", "strict")
            .await
            .assert_kind(ErrorKind::PolicyNotFound);
    }
}
