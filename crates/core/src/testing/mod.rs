//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every collaborator the
//! orchestrator talks to, so runs can be exercised without a real registry,
//! database or worker pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use mirror_sync_core::testing::{fixtures, MockRegistry, MockWatermarkStore, MockWorker};
//!
//! let registry = MockRegistry::with_listing(fixtures::names(&["a", "b"]));
//! let store = MockWatermarkStore::new();
//! let worker = MockWorker::new();
//! worker.fail_package("b").await;
//!
//! // Wire into a SyncOrchestrator and run...
//! ```

mod mock_package_syncer;
mod mock_registry;
mod mock_watermark_store;
mod mock_worker;

pub use mock_package_syncer::MockPackageSyncer;
pub use mock_registry::{MockRegistry, RecordedRegistryCall};
pub use mock_watermark_store::MockWatermarkStore;
pub use mock_worker::MockWorker;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Map, Value};

    use crate::registry::{ChangeFeed, ChangeRecord, FEED_UPDATED_KEY};

    /// Owned package names from string slices.
    pub fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// A change feed in list form.
    pub fn change_records(items: &[&str]) -> ChangeFeed {
        ChangeFeed::Records(items.iter().map(|name| ChangeRecord::named(*name)).collect())
    }

    /// A change feed in mapping form, including the bookkeeping key.
    pub fn change_mapping(items: &[&str]) -> ChangeFeed {
        let mut map = Map::new();
        map.insert(FEED_UPDATED_KEY.to_string(), json!(1_700_000_000_000u64));
        for name in items {
            map.insert(name.to_string(), json!({ "name": name }));
        }
        ChangeFeed::Mapping(map)
    }

    /// A minimal package document with a `latest` version and its dependencies.
    pub fn package_doc(name: &str, latest: &str, dependencies: &[&str]) -> Value {
        let deps: Map<String, Value> = dependencies
            .iter()
            .map(|dep| (dep.to_string(), json!("*")))
            .collect();
        json!({
            "name": name,
            "dist-tags": { "latest": latest },
            "versions": {
                latest: { "name": name, "version": latest, "dependencies": deps }
            }
        })
    }
}
