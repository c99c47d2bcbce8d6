//! Per-package sync.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::package_store::{PackageStore, PackageStoreError};
use crate::registry::{RegistryClient, RegistryError};

/// Errors from syncing a single package.
#[derive(Debug, Error)]
pub enum PackageSyncError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("store error: {0}")]
    Store(#[from] PackageStoreError),

    /// Upstream returned a document that does not describe the package.
    #[error("invalid document for {name}: {reason}")]
    InvalidDocument { name: String, reason: String },

    /// The sync task panicked or was aborted.
    #[error("sync task aborted: {0}")]
    Aborted(String),
}

/// Job-level settings visible to each package sync.
#[derive(Debug, Clone)]
pub struct PackageSyncContext {
    pub actor: String,
    pub sync_upstream_first: bool,
}

/// Result of syncing one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncedPackage {
    /// Dependency names found in the synced document.
    pub dependencies: Vec<String>,
    /// The package no longer exists upstream and was dropped locally.
    pub removed: bool,
}

/// Syncs one package from upstream into the mirror.
#[async_trait]
pub trait PackageSyncer: Send + Sync {
    async fn sync_package(
        &self,
        name: &str,
        ctx: &PackageSyncContext,
    ) -> Result<SyncedPackage, PackageSyncError>;
}

/// Copies package documents from the upstream registry into a [`PackageStore`].
///
/// Always reads from the configured upstream; `sync_upstream_first` has no
/// parent registry to consult here.
pub struct RegistryPackageSyncer {
    registry: Arc<dyn RegistryClient>,
    store: Arc<dyn PackageStore>,
}

impl RegistryPackageSyncer {
    pub fn new(registry: Arc<dyn RegistryClient>, store: Arc<dyn PackageStore>) -> Self {
        Self { registry, store }
    }
}

#[async_trait]
impl PackageSyncer for RegistryPackageSyncer {
    async fn sync_package(
        &self,
        name: &str,
        ctx: &PackageSyncContext,
    ) -> Result<SyncedPackage, PackageSyncError> {
        let Some(document) = self.registry.fetch_package(name).await? else {
            let existed = self.store.remove(name)?;
            if existed {
                info!("Package {} is gone upstream, removed from mirror", name);
            }
            return Ok(SyncedPackage {
                dependencies: Vec::new(),
                removed: true,
            });
        };

        if let Some(doc_name) = document.get("name").and_then(Value::as_str) {
            if doc_name != name {
                return Err(PackageSyncError::InvalidDocument {
                    name: name.to_string(),
                    reason: format!("document is for {}", doc_name),
                });
            }
        }

        self.store.upsert(name, &document, &ctx.actor)?;
        let dependencies = latest_dependencies(&document);
        debug!(
            "Synced {} as {} ({} dependencies)",
            name,
            ctx.actor,
            dependencies.len()
        );

        Ok(SyncedPackage {
            dependencies,
            removed: false,
        })
    }
}

/// Dependency names of the `latest` dist-tag version.
fn latest_dependencies(document: &Value) -> Vec<String> {
    let latest = document
        .get("dist-tags")
        .and_then(|tags| tags.get("latest"))
        .and_then(Value::as_str);

    latest
        .and_then(|version| document.get("versions")?.get(version)?.get("dependencies"))
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}
