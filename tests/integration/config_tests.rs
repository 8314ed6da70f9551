//! Configuration loading and its effect on engine behavior

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{CTX, SECRET};
    use crate::common::{ResultAssertions, TestEngine};
    use rbac_engine::core::models::{PwPolicy, User};
    use rbac_engine::{EngineConfig, ErrorKind, RbacEngine, RbacError};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_engine_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"directory:\n  timeout_ms: 250\nsession:\n  idle_timeout_secs: 60\n  max_lifetime_secs: 0\n",
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).await.unwrap();
        let env = TestEngine::with_config(config);
        env.seed_bank().await;

        assert_eq!(env.engine.config().directory.timeout_ms, 250);

        let session = env.login("ursula").await.unwrap();
        env.advance_secs(61);
        env.engine
            .check_access(&session, "Account", "read")
            .await
            .assert_kind(ErrorKind::SessionExpired);
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("RBAC_DIRECTORY_TIMEOUT_MS", "900"),
            ("RBAC_SESSION_IDLE_TIMEOUT_SECS", "120"),
            ("RBAC_DEFAULT_PASSWORD_POLICY", "corporate"),
            ("RBAC_ENFORCE_SSD_ON_INHERITANCE", "true"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.directory.timeout_ms, 900);
        assert_eq!(config.session.idle_timeout_secs, 120);
        assert_eq!(config.password.default_policy.as_deref(), Some("corporate"));
        assert!(config.hierarchy.enforce_ssd_on_inheritance);
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let result = EngineConfig::from_lookup(|k| {
            (k == "RBAC_SESSION_MAX_LIFETIME_SECS").then(|| "forever".to_string())
        });
        assert!(matches!(result, Err(RbacError::Config(_))));
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.directory.timeout_ms = 0;
        RbacEngine::new(config).assert_kind(ErrorKind::Config);

        let mut config = EngineConfig::default();
        config.logging.level = "   ".to_string();
        RbacEngine::new(config).assert_kind(ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_default_policy_must_exist_for_new_passwords() {
        let mut config = EngineConfig::default();
        config.password.default_policy = Some("corporate".to_string());
        let env = TestEngine::with_config(config);
        let admin = env.engine.admin();

        admin
            .add_user(CTX, User::new("nina"), Some(SECRET))
            .await
            .assert_kind(ErrorKind::PolicyNotFound);

        env.engine
            .policies()
            .add(CTX, PwPolicy::new("corporate"))
            .await
            .unwrap();
        admin.add_user(CTX, User::new("nina"), Some(SECRET)).await.unwrap();
    }

    #[test]
    fn test_yaml_round_trip_keeps_values() {
        let mut config = EngineConfig::default();
        config.session.max_lifetime_secs = 7200;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(EngineConfig::from_yaml(&yaml).unwrap(), config);
    }
}
