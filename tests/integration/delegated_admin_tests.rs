//! Delegated administration (ARBAC) tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{CTX, SECRET};
    use crate::common::{ResultAssertions, TestEngine};
    use rbac_engine::core::models::{AdminRole, Permission, RoleRange};
    use rbac_engine::{AdminRoleUpdate, ErrorKind, SessionRequest};

    /// Bank model plus `HelpDesk <- BranchManager` in the admin hierarchy.
    ///
    /// HelpDesk manages Branch users and Accounts permissions over
    /// `[BranchStaff, Teller]`; `hal` holds BranchManager.
    async fn delegated_bank() -> TestEngine {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();

        admin
            .add_admin_role(
                CTX,
                AdminRole::new("HelpDesk")
                    .with_user_ous(["Branch"])
                    .with_perm_ous(["Accounts"])
                    .with_range(RoleRange::inclusive("BranchStaff", "Teller")),
            )
            .await
            .unwrap();
        admin
            .add_admin_role(CTX, AdminRole::new("BranchManager"))
            .await
            .unwrap();
        admin
            .add_admin_inheritance(CTX, "HelpDesk", "BranchManager")
            .await
            .unwrap();

        admin
            .add_permission(CTX, Permission::admin("AdminMgr", "assignUser"))
            .await
            .unwrap();
        admin
            .grant_admin_permission(CTX, "AdminMgr", "assignUser", "HelpDesk")
            .await
            .unwrap();

        env.add_user("hal", &[]).await;
        admin
            .assign_admin_user(CTX, "hal", "BranchManager", None)
            .await
            .unwrap();
        env
    }

    #[tokio::test]
    async fn test_admin_permission_inherited_in_admin_hierarchy() {
        let env = delegated_bank().await;
        let session = env.login("hal").await.unwrap();
        let delegated = env.engine.delegated();

        assert!(delegated.check_admin_access(&session, "AdminMgr", "assignUser").await.unwrap());
        assert!(!delegated.check_admin_access(&session, "AdminMgr", "deleteUser").await.unwrap());
        assert!(!env.engine.check_access(&session, "AdminMgr", "assignUser").await.unwrap());

        let permissions = delegated.admin_session_permissions(&session).await.unwrap();
        assert_eq!(permissions.len(), 1);
        assert!(permissions[0].admin);
    }

    #[tokio::test]
    async fn test_assignment_scope_follows_ou_and_range() {
        let env = delegated_bank().await;
        let session = env.login("hal").await.unwrap();
        let delegated = env.engine.delegated();

        assert!(delegated.can_assign(&session, "ursula", "Teller").await.unwrap());
        assert!(delegated.can_deassign(&session, "ursula", "BranchStaff").await.unwrap());
        assert!(!delegated.can_assign(&session, "ursula", "HeadTeller").await.unwrap());
        assert!(!delegated.can_assign(&session, "ursula", "Employee").await.unwrap());
        assert!(!delegated.can_assign(&session, "ursula", "Auditor").await.unwrap());

        env.engine
            .admin()
            .update_user(
                CTX,
                "ursula",
                rbac_engine::UserUpdate {
                    ou: Some("Head Office".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!delegated.can_assign(&session, "ursula", "Teller").await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_scope_follows_permission_ou() {
        let env = delegated_bank().await;
        let session = env.login("hal").await.unwrap();
        let delegated = env.engine.delegated();

        assert!(delegated.can_grant(&session, "Teller", "Account", "read").await.unwrap());
        assert!(delegated.can_revoke(&session, "BranchStaff", "Account", "read").await.unwrap());
        assert!(!delegated.can_grant(&session, "Teller", "Ledger", "audit").await.unwrap());
        delegated
            .can_grant(&session, "Teller", "Vault", "open")
            .await
            .assert_kind(ErrorKind::PermissionNotFound);
    }

    #[tokio::test]
    async fn test_range_update_narrows_scope() {
        let env = delegated_bank().await;
        let admin = env.engine.admin();
        admin
            .update_admin_role(
                CTX,
                "HelpDesk",
                AdminRoleUpdate {
                    range: Some(RoleRange {
                        begin: "BranchStaff".to_string(),
                        end: "Teller".to_string(),
                        begin_inclusive: true,
                        end_inclusive: false,
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let session = env.login("hal").await.unwrap();
        let delegated = env.engine.delegated();
        assert!(delegated.can_assign(&session, "ursula", "BranchStaff").await.unwrap());
        assert!(!delegated.can_assign(&session, "ursula", "Teller").await.unwrap());

        admin
            .update_admin_role(
                CTX,
                "HelpDesk",
                AdminRoleUpdate {
                    range: Some(RoleRange::inclusive("Ghost", "Teller")),
                    ..Default::default()
                },
            )
            .await
            .assert_kind(ErrorKind::RoleNotFound);
    }

    #[tokio::test]
    async fn test_admin_role_activation() {
        let env = delegated_bank().await;

        env.engine
            .create_session(CTX, SessionRequest::new("hal", SECRET).with_admin_roles(["HelpDesk"]))
            .await
            .assert_kind(ErrorKind::RoleNotAssigned);

        let session = env
            .engine
            .create_session(
                CTX,
                SessionRequest::new("hal", SECRET).with_admin_roles(Vec::<String>::new()),
            )
            .await
            .unwrap();
        assert!(!env
            .engine
            .delegated()
            .can_assign(&session, "ursula", "Teller")
            .await
            .unwrap());

        env.engine
            .admin()
            .deassign_admin_user(CTX, "hal", "BranchManager")
            .await
            .unwrap();
        let session = env.login("hal").await.unwrap();
        assert!(session.admin_roles().is_empty());
        assert!(!env
            .engine
            .delegated()
            .check_admin_access(&session, "AdminMgr", "assignUser")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_admin_role_cleans_up() {
        let env = delegated_bank().await;
        env.engine.admin().delete_admin_role(CTX, "HelpDesk").await.unwrap();

        let session = env.login("hal").await.unwrap();
        let delegated = env.engine.delegated();
        assert!(!delegated.check_admin_access(&session, "AdminMgr", "assignUser").await.unwrap());
        assert!(!delegated.can_assign(&session, "ursula", "Teller").await.unwrap());
    }
}
