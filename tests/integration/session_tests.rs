//! Session lifecycle and permission check tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{CTX, SECRET, t0};
    use crate::common::{ResultAssertions, TestEngine};
    use chrono::{Duration, NaiveDate};
    use rbac_engine::core::models::{Constraint, DayMask};
    use rbac_engine::{EngineConfig, ErrorKind, SessionRequest};

    #[tokio::test]
    async fn test_inherited_grant_then_revoke() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();

        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());

        env.engine
            .admin()
            .revoke_permission(CTX, "Account", "read", "BranchStaff")
            .await
            .unwrap();
        assert!(!env.engine.check_access(&session, "Account", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_check_access_is_idempotent() {
        let env = TestEngine::bank().await;
        env.engine
            .admin()
            .assign_user(CTX, "ursula", "Auditor", None)
            .await
            .unwrap();

        let mut session = env
            .engine
            .create_session(CTX, SessionRequest::new("ursula", SECRET).with_roles(["Teller"]))
            .await
            .unwrap();

        let first = env.engine.check_access(&session, "Ledger", "audit").await.unwrap();
        let second = env.engine.check_access(&session, "Ledger", "audit").await.unwrap();
        assert_eq!(first, second);
        assert!(!first);

        let access = env.engine.access();
        access.add_active_role(&mut session, "Auditor").await.unwrap();
        assert!(env.engine.check_access(&session, "Ledger", "audit").await.unwrap());

        access.drop_active_role(&mut session, "Auditor").unwrap();
        assert_eq!(
            first,
            env.engine.check_access(&session, "Ledger", "audit").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_session_permissions_and_roles() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();

        let permissions = env.engine.session_permissions(&session).await.unwrap();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].op_name, "read");

        let authorized = env.engine.access().authorized_roles(&session).await.unwrap();
        assert_eq!(
            authorized.into_iter().collect::<Vec<_>>(),
            vec!["BranchStaff", "Employee", "Teller"]
        );
    }

    #[tokio::test]
    async fn test_default_activation_skips_roles_outside_their_window() {
        let env = TestEngine::bank().await;
        // t0 is a Saturday
        let weekdays: DayMask = "23456".parse().unwrap();
        env.engine
            .admin()
            .assign_user(CTX, "ursula", "Auditor", Some(Constraint::new().with_days(weekdays)))
            .await
            .unwrap();

        let session = env.login("ursula").await.unwrap();
        assert_eq!(session.role_names(), vec!["Teller".to_string()]);

        env.engine
            .create_session(
                CTX,
                SessionRequest::new("ursula", SECRET).with_roles(["Auditor"]),
            )
            .await
            .assert_kind(ErrorKind::TemporalConstraint);

        env.clock.set(t0() + Duration::days(2));
        let session = env.login("ursula").await.unwrap();
        assert_eq!(session.roles().len(), 2);
    }

    #[tokio::test]
    async fn test_role_outside_window_stops_granting() {
        let mut config = EngineConfig::default();
        config.session.idle_timeout_secs = 0;
        config.session.max_lifetime_secs = 0;
        let env = TestEngine::with_config(config);
        env.seed_bank().await;
        let until_today = Constraint::new().with_dates(None, NaiveDate::from_ymd_opt(2024, 6, 1));
        env.engine
            .admin()
            .update_role(CTX, "Teller", rbac_engine::RoleUpdate {
                constraint: Some(until_today),
                ..Default::default()
            })
            .await
            .unwrap();

        let session = env.login("ursula").await.unwrap();
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());

        env.advance_secs(24 * 3600);
        assert!(!env.engine.check_access(&session, "Account", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_lifetime_expiry_is_lazy() {
        let mut config = EngineConfig::default();
        config.session.max_lifetime_secs = 600;
        config.session.idle_timeout_secs = 0;
        let env = TestEngine::with_config(config);
        env.seed_bank().await;

        let session = env.login("ursula").await.unwrap();
        assert_eq!(session.absolute_deadline(), Some(t0() + Duration::seconds(600)));
        assert_eq!(session.idle_timeout_secs(), None);

        env.advance_secs(600);
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());
        env.advance_secs(1);
        env.engine
            .check_access(&session, "Account", "read")
            .await
            .assert_kind(ErrorKind::SessionExpired);
    }

    #[tokio::test]
    async fn test_trusted_session_and_logout() {
        let env = TestEngine::bank().await;
        let session = env
            .engine
            .create_session(CTX, SessionRequest::trusted("ursula"))
            .await
            .unwrap();
        assert!(session.is_trusted());
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());

        let user = env.engine.access().session_user(&session).await.unwrap();
        assert_eq!(user.user_id, "ursula");
        assert!(user.password_hash.is_none());
        env.engine.access().logout(session);
    }

    #[tokio::test]
    async fn test_contexts_are_isolated() {
        let env = TestEngine::bank().await;
        env.engine
            .create_session("globex", SessionRequest::new("ursula", SECRET))
            .await
            .assert_kind(ErrorKind::UserNotFound);
    }
}
