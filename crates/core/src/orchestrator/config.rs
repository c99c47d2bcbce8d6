//! Sync run configuration.

use serde::{Deserialize, Serialize};

/// Configuration for sync runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum packages synced in parallel.
    /// Passed through to the worker unchanged.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Identity recorded as the syncing user.
    #[serde(default = "default_actor")]
    pub actor: String,
}

fn default_concurrency() -> usize {
    1
}

fn default_actor() -> String {
    "admin".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            actor: default_actor(),
        }
    }
}
