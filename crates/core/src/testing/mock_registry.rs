//! Mock registry client for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::registry::{ChangeFeed, RegistryClient, RegistryError};

/// A recorded registry call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRegistryCall {
    ListAll,
    ChangedSince { since: DateTime<Utc> },
    FetchPackage { name: String },
}

/// Mock implementation of the RegistryClient trait.
///
/// Provides controllable behavior for testing:
/// - Configurable listing, change feed and package documents
/// - Track calls for assertions
/// - Simulate failures
#[derive(Debug)]
pub struct MockRegistry {
    /// Full package listing.
    listing: Arc<RwLock<Vec<String>>>,
    /// Change feed returned for any `changed_since` query.
    changes: Arc<RwLock<Option<ChangeFeed>>>,
    /// Package documents by name.
    packages: Arc<RwLock<HashMap<String, Value>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedRegistryCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<RegistryError>>>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistry {
    /// Create a new empty mock registry.
    pub fn new() -> Self {
        Self::with_listing(Vec::new())
    }

    /// Create a mock registry with a package listing.
    pub fn with_listing(listing: Vec<String>) -> Self {
        Self {
            listing: Arc::new(RwLock::new(listing)),
            changes: Arc::new(RwLock::new(None)),
            packages: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the package listing.
    pub async fn set_listing(&self, listing: Vec<String>) {
        *self.listing.write().await = listing;
    }

    /// Set the change feed (`None` = registry reports nothing).
    pub async fn set_changes(&self, changes: Option<ChangeFeed>) {
        *self.changes.write().await = changes;
    }

    /// Add a package document.
    pub async fn add_package(&self, name: &str, document: Value) {
        self.packages
            .write()
            .await
            .insert(name.to_string(), document);
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedRegistryCall> {
        self.calls.read().await.clone()
    }

    /// Set an error to be returned on the next operation.
    pub async fn set_next_error(&self, error: RegistryError) {
        *self.next_error.write().await = Some(error);
    }

    async fn record(&self, call: RecordedRegistryCall) -> Result<(), RegistryError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn list_all(&self) -> Result<Vec<String>, RegistryError> {
        self.record(RecordedRegistryCall::ListAll).await?;
        Ok(self.listing.read().await.clone())
    }

    async fn changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Option<ChangeFeed>, RegistryError> {
        self.record(RecordedRegistryCall::ChangedSince { since }).await?;
        Ok(self.changes.read().await.clone())
    }

    async fn fetch_package(&self, name: &str) -> Result<Option<Value>, RegistryError> {
        self.record(RecordedRegistryCall::FetchPackage {
            name: name.to_string(),
        })
        .await?;
        Ok(self.packages.read().await.get(name).cloned())
    }
}
