//! Package storage trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for package storage operations.
#[derive(Debug, Error)]
pub enum PackageStoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(String),

    /// Stored document could not be encoded or decoded.
    #[error("invalid package document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for PackageStoreError {
    fn from(e: rusqlite::Error) -> Self {
        PackageStoreError::Database(e.to_string())
    }
}

/// A mirrored package document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub document: serde_json::Value,
    /// Actor the sync ran as.
    pub synced_by: String,
    pub synced_at: DateTime<Utc>,
}

/// Trait for package storage backends.
pub trait PackageStore: Send + Sync {
    /// Insert or replace a package document.
    fn upsert(
        &self,
        name: &str,
        document: &serde_json::Value,
        synced_by: &str,
    ) -> Result<PackageRecord, PackageStoreError>;

    /// Get a package by name.
    fn get(&self, name: &str) -> Result<Option<PackageRecord>, PackageStoreError>;

    /// Remove a package. Returns whether it existed.
    fn remove(&self, name: &str) -> Result<bool, PackageStoreError>;

    /// Number of mirrored packages.
    fn count(&self) -> Result<i64, PackageStoreError>;
}
