//! Mock package syncer for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::registry::RegistryError;
use crate::worker::{PackageSyncContext, PackageSyncError, PackageSyncer, SyncedPackage};

/// Mock implementation of the PackageSyncer trait.
///
/// Provides controllable behavior for testing:
/// - Per-package failures, panics, removals and dependency lists
/// - Artificial latency
/// - Tracks synced names and the peak number of concurrent syncs
#[derive(Debug, Default)]
pub struct MockPackageSyncer {
    synced: Arc<RwLock<Vec<String>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    panicking: Arc<RwLock<HashSet<String>>>,
    removed: Arc<RwLock<HashSet<String>>>,
    dependencies: Arc<RwLock<HashMap<String, Vec<String>>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockPackageSyncer {
    /// Create a syncer that succeeds for every package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail syncs of `name`.
    pub async fn fail_package(&self, name: &str) {
        self.failing.write().await.insert(name.to_string());
    }

    /// Panic while syncing `name`.
    pub async fn panic_on(&self, name: &str) {
        self.panicking.write().await.insert(name.to_string());
    }

    /// Report `name` as gone upstream.
    pub async fn remove_package(&self, name: &str) {
        self.removed.write().await.insert(name.to_string());
    }

    /// Report `dependencies` when `name` is synced.
    pub async fn set_dependencies(&self, name: &str, dependencies: Vec<String>) {
        self.dependencies
            .write()
            .await
            .insert(name.to_string(), dependencies);
    }

    /// Sleep this long inside every sync.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Names passed to `sync_package`, in call order.
    pub async fn synced_names(&self) -> Vec<String> {
        self.synced.read().await.clone()
    }

    /// Highest number of syncs observed running at once.
    pub async fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageSyncer for MockPackageSyncer {
    async fn sync_package(
        &self,
        name: &str,
        _ctx: &PackageSyncContext,
    ) -> Result<SyncedPackage, PackageSyncError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.synced.write().await.push(name.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let should_panic = self.panicking.read().await.contains(name);
        let should_fail = self.failing.read().await.contains(name);
        let removed = self.removed.read().await.contains(name);
        let dependencies = self
            .dependencies
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if should_panic {
            panic!("mock syncer panic for {}", name);
        }
        if should_fail {
            return Err(PackageSyncError::Registry(RegistryError::ApiError {
                status: 500,
                message: format!("mock failure for {}", name),
            }));
        }

        Ok(SyncedPackage {
            dependencies,
            removed,
        })
    }
}
