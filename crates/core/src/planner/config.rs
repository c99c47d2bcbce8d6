//! Planner configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sync planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Seconds subtracted from the watermark when querying upstream changes.
    /// Absorbs clock drift and upstream replication lag; the persisted
    /// watermark is never shifted by this amount.
    #[serde(default = "default_skew")]
    pub skew_secs: u64,
}

fn default_skew() -> u64 {
    600 // 10 minutes
}

impl PlannerConfig {
    pub fn skew(&self) -> Duration {
        Duration::from_secs(self.skew_secs)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            skew_secs: default_skew(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.skew_secs, 600);
        assert_eq!(config.skew(), Duration::from_secs(600));
    }

    #[test]
    fn test_deserialize_empty() {
        let config: PlannerConfig = toml::from_str("").unwrap();
        assert_eq!(config.skew_secs, 600);
    }
}
