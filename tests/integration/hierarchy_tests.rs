//! Role hierarchy tests through the engine API

#[cfg(test)]
mod tests {
    use crate::common::fixtures::CTX;
    use crate::common::{ResultAssertions, TestEngine};
    use rbac_engine::core::models::Role;
    use rbac_engine::directory::DirectoryStore;
    use rbac_engine::ErrorKind;

    #[tokio::test]
    async fn test_cycle_detected_and_graph_unchanged() {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();

        admin
            .add_inheritance(CTX, "HeadTeller", "Employee")
            .await
            .assert_kind(ErrorKind::CycleDetected);
        admin
            .add_inheritance(CTX, "Teller", "Teller")
            .await
            .assert_kind(ErrorKind::CycleDetected);

        let employee = env.memory.read_role(CTX, "Employee").await.unwrap().unwrap();
        assert!(employee.parents.is_empty());
        let users = env.engine.review().authorized_users(CTX, "HeadTeller").await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_edges_visible_in_both_directions() {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();
        admin.add_role(CTX, Role::new("Trainee")).await.unwrap();
        admin.add_inheritance(CTX, "Teller", "Trainee").await.unwrap();

        env.add_user("tom", &["Trainee"]).await;
        let users = env.engine.review().authorized_users(CTX, "Teller").await.unwrap();
        assert!(users.contains(&"tom".to_string()));

        let permissions = env
            .engine
            .review()
            .role_permissions(CTX, "Trainee", true)
            .await
            .unwrap();
        assert_eq!(permissions.len(), 1);

        let teller = env.memory.read_role(CTX, "Teller").await.unwrap().unwrap();
        assert!(teller.children.contains("Trainee"));
        let trainee = env.memory.read_role(CTX, "Trainee").await.unwrap().unwrap();
        assert!(trainee.parents.contains("Teller"));
    }

    #[tokio::test]
    async fn test_removing_edge_revokes_inherited_access() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();
        assert!(env.engine.check_access(&session, "Account", "read").await.unwrap());

        env.engine
            .admin()
            .delete_inheritance(CTX, "BranchStaff", "Teller")
            .await
            .unwrap();
        assert!(!env.engine.check_access(&session, "Account", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_roles() {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();

        admin
            .add_inheritance(CTX, "Ghost", "Teller")
            .await
            .assert_kind(ErrorKind::RoleNotFound);
        admin
            .assign_user(CTX, "ursula", "Ghost", None)
            .await
            .assert_kind(ErrorKind::RoleNotFound);
        env.engine
            .review()
            .role_permissions(CTX, "Ghost", true)
            .await
            .assert_kind(ErrorKind::RoleNotFound);
    }

    #[tokio::test]
    async fn test_graph_reload_after_external_edit() {
        let env = TestEngine::bank().await;
        let session = env.login("ursula").await.unwrap();
        assert!(!env.engine.check_access(&session, "Ledger", "audit").await.unwrap());

        env.memory
            .write_role_edge(CTX, "Auditor", "Teller", rbac_engine::core::models::EdgeOp::Add)
            .await
            .unwrap();
        env.engine.invalidate_graphs(CTX);
        assert!(env.engine.check_access(&session, "Ledger", "audit").await.unwrap());
    }
}
