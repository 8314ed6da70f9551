//! Separation-of-duty tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{CTX, SECRET};
    use crate::common::{ResultAssertions, TestEngine};
    use rbac_engine::core::models::{Role, SdSet, SdType};
    use rbac_engine::{ErrorKind, RbacError, SessionRequest};

    async fn with_duties(cardinality: u32) -> TestEngine {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();
        for role in ["Approver", "Requester", "Payer"] {
            admin.add_role(CTX, Role::new(role)).await.unwrap();
        }
        admin
            .add_ssd(
                CTX,
                SdSet::new("Payments", SdType::Static, ["Approver", "Requester", "Payer"], cardinality),
            )
            .await
            .unwrap();
        env
    }

    #[tokio::test]
    async fn test_ssd_allows_up_to_cardinality_minus_one() {
        let env = with_duties(3).await;
        let admin = env.engine.admin();

        admin.assign_user(CTX, "ursula", "Approver", None).await.unwrap();
        admin.assign_user(CTX, "ursula", "Requester", None).await.unwrap();
        let err = admin
            .assign_user(CTX, "ursula", "Payer", None)
            .await
            .assert_kind(ErrorKind::SoDViolation);
        assert!(matches!(err, RbacError::SoDViolation { ref set_name, .. } if set_name == "Payments"));

        let roles = env.engine.review().assigned_roles(CTX, "ursula").await.unwrap();
        assert_eq!(roles.len(), 3);
    }

    #[tokio::test]
    async fn test_ssd_cardinality_two() {
        let env = with_duties(2).await;
        let admin = env.engine.admin();

        admin.assign_user(CTX, "ursula", "Payer", None).await.unwrap();
        admin
            .assign_user(CTX, "ursula", "Approver", None)
            .await
            .assert_kind(ErrorKind::SoDViolation);
    }

    #[tokio::test]
    async fn test_ssd_conflict_through_inheritance() {
        let env = with_duties(2).await;
        let admin = env.engine.admin();
        admin
            .add_descendant(CTX, "Approver", Role::new("SeniorApprover"))
            .await
            .unwrap();

        admin.assign_user(CTX, "ursula", "Requester", None).await.unwrap();
        admin
            .assign_user(CTX, "ursula", "SeniorApprover", None)
            .await
            .assert_kind(ErrorKind::SoDViolation);
    }

    #[tokio::test]
    async fn test_dsd_blocks_activation_not_assignment() {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();
        admin
            .add_dsd(CTX, SdSet::new("CashVsAudit", SdType::Dynamic, ["Teller", "Auditor"], 2))
            .await
            .unwrap();
        admin.assign_user(CTX, "ursula", "Auditor", None).await.unwrap();

        env.login("ursula").await.assert_kind(ErrorKind::SoDViolation);

        let mut session = env
            .engine
            .create_session(CTX, SessionRequest::new("ursula", SECRET).with_roles(["Auditor"]))
            .await
            .unwrap();
        env.engine
            .access()
            .add_active_role(&mut session, "HeadTeller")
            .await
            .assert_kind(ErrorKind::RoleNotAssigned);
        env.engine
            .access()
            .add_active_role(&mut session, "Teller")
            .await
            .assert_kind(ErrorKind::SoDViolation);

        assert_eq!(
            env.engine.review().dsd_role_sets(CTX, "teller").await.unwrap()[0].name,
            "CashVsAudit"
        );
    }

    #[tokio::test]
    async fn test_dsd_through_inheritance() {
        let env = TestEngine::bank().await;
        let admin = env.engine.admin();
        admin
            .add_dsd(CTX, SdSet::new("StaffVsAudit", SdType::Dynamic, ["BranchStaff", "Auditor"], 2))
            .await
            .unwrap();
        env.add_user("hank", &["HeadTeller", "Auditor"]).await;

        env.login("hank").await.assert_kind(ErrorKind::SoDViolation);
        env.engine
            .create_session(CTX, SessionRequest::new("hank", SECRET).with_roles(["HeadTeller"]))
            .await
            .unwrap();
    }
}
