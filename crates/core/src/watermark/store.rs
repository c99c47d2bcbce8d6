//! Watermark storage trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for watermark operations.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// No watermark record exists at all.
    #[error("watermark record not found")]
    NotFound,

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for WatermarkError {
    fn from(e: rusqlite::Error) -> Self {
        WatermarkError::Database(e.to_string())
    }
}

/// How a run selects packages, derived from the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Never completed a run: walk the full upstream listing.
    Bootstrap,
    /// Only packages changed since the last successful run.
    Incremental,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Bootstrap => write!(f, "bootstrap"),
            SyncMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// High-water mark of the last fully successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Start time of the last run that finished with zero failures.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Last package confirmed synced during an unfinished bootstrap.
    pub last_sync_module: Option<String>,
}

impl Watermark {
    /// A watermark for a mirror that has never synced.
    pub fn never_synced() -> Self {
        Self::default()
    }

    /// A watermark resuming a bootstrap after `module`.
    pub fn resuming_after(module: impl Into<String>) -> Self {
        Self {
            last_sync_time: None,
            last_sync_module: Some(module.into()),
        }
    }

    /// A watermark for a mirror last fully synced at `time`.
    pub fn synced_at(time: DateTime<Utc>) -> Self {
        Self {
            last_sync_time: Some(time),
            last_sync_module: None,
        }
    }

    pub fn mode(&self) -> SyncMode {
        if self.last_sync_time.is_some() {
            SyncMode::Incremental
        } else {
            SyncMode::Bootstrap
        }
    }
}

/// Trait for watermark storage backends.
///
/// Implementations must never move `last_sync_time` backwards.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Read the current watermark. Fails with [`WatermarkError::NotFound`]
    /// when no record exists.
    async fn read(&self) -> Result<Watermark, WatermarkError>;

    /// Persist a new `last_sync_time`.
    ///
    /// Returns `false` when `time` is not newer than the stored value and the
    /// write was ignored.
    async fn write(&self, time: DateTime<Utc>) -> Result<bool, WatermarkError>;

    /// Persist the bootstrap resume pointer.
    async fn record_module(&self, name: &str) -> Result<(), WatermarkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_derivation() {
        assert_eq!(Watermark::never_synced().mode(), SyncMode::Bootstrap);
        assert_eq!(Watermark::resuming_after("lodash").mode(), SyncMode::Bootstrap);
        assert_eq!(Watermark::synced_at(Utc::now()).mode(), SyncMode::Incremental);
    }

    #[test]
    fn test_mode_ignores_module_once_synced() {
        let watermark = Watermark {
            last_sync_time: Some(Utc::now()),
            last_sync_module: Some("left-pad".to_string()),
        };
        assert_eq!(watermark.mode(), SyncMode::Incremental);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SyncMode::Bootstrap.to_string(), "bootstrap");
        assert_eq!(SyncMode::Incremental.to_string(), "incremental");
    }
}
