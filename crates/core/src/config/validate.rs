use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Registry URL is an absolute http(s) URL
/// - Server port is not 0
/// - Sync concurrency is positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url = config.registry.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "registry.url must be an http(s) URL, got {:?}",
            config.registry.url
        )));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sync.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "sync.concurrency must be at least 1".to_string(),
        ));
    }

    if config.sync.actor.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "sync.actor cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, RegistryConfig, SchedulerConfig, ServerConfig};
    use crate::orchestrator::SyncConfig;
    use crate::planner::PlannerConfig;

    fn valid_config() -> Config {
        Config {
            registry: RegistryConfig {
                url: "https://registry.npmjs.org".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            planner: PlannerConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = valid_config();
        config.sync.concurrency = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("sync.concurrency"));
    }

    #[test]
    fn test_validate_registry_url_scheme() {
        let mut config = valid_config();
        config.registry.url = "registry.npmjs.org".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("registry.url"));
    }

    #[test]
    fn test_validate_blank_actor_fails() {
        let mut config = valid_config();
        config.sync.actor = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
