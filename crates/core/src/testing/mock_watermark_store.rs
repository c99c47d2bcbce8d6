//! Mock watermark store for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::watermark::{Watermark, WatermarkError, WatermarkStore};

/// Mock implementation of the WatermarkStore trait.
///
/// Keeps the watermark in memory and records every read and write so tests
/// can assert exactly when the orchestrator touched it.
#[derive(Debug)]
pub struct MockWatermarkStore {
    /// Current record (`None` = no record exists).
    watermark: Arc<RwLock<Option<Watermark>>>,
    /// Every `write` call, in order.
    writes: Arc<RwLock<Vec<DateTime<Utc>>>>,
    /// Every `record_module` call, in order.
    modules: Arc<RwLock<Vec<String>>>,
    /// Number of `read` calls.
    reads: Arc<RwLock<usize>>,
    /// If set, the next write will fail with this error.
    next_write_error: Arc<RwLock<Option<WatermarkError>>>,
}

impl Default for MockWatermarkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWatermarkStore {
    /// Create a store for a mirror that has never synced.
    pub fn new() -> Self {
        Self::with_watermark(Watermark::never_synced())
    }

    /// Create a store holding `watermark`.
    pub fn with_watermark(watermark: Watermark) -> Self {
        Self::from_record(Some(watermark))
    }

    /// Create a store with no watermark record at all.
    pub fn missing() -> Self {
        Self::from_record(None)
    }

    fn from_record(record: Option<Watermark>) -> Self {
        Self {
            watermark: Arc::new(RwLock::new(record)),
            writes: Arc::new(RwLock::new(Vec::new())),
            modules: Arc::new(RwLock::new(Vec::new())),
            reads: Arc::new(RwLock::new(0)),
            next_write_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Current watermark record.
    pub async fn watermark(&self) -> Option<Watermark> {
        self.watermark.read().await.clone()
    }

    /// All recorded writes.
    pub async fn writes(&self) -> Vec<DateTime<Utc>> {
        self.writes.read().await.clone()
    }

    /// All recorded resume pointers.
    pub async fn recorded_modules(&self) -> Vec<String> {
        self.modules.read().await.clone()
    }

    /// Number of reads so far.
    pub async fn read_count(&self) -> usize {
        *self.reads.read().await
    }

    /// Fail the next write with `error`.
    pub async fn set_next_write_error(&self, error: WatermarkError) {
        *self.next_write_error.write().await = Some(error);
    }
}

#[async_trait]
impl WatermarkStore for MockWatermarkStore {
    async fn read(&self) -> Result<Watermark, WatermarkError> {
        *self.reads.write().await += 1;
        self.watermark
            .read()
            .await
            .clone()
            .ok_or(WatermarkError::NotFound)
    }

    async fn write(&self, time: DateTime<Utc>) -> Result<bool, WatermarkError> {
        if let Some(error) = self.next_write_error.write().await.take() {
            return Err(error);
        }

        let mut guard = self.watermark.write().await;
        let Some(watermark) = guard.as_mut() else {
            return Err(WatermarkError::NotFound);
        };

        self.writes.write().await.push(time);
        if watermark.last_sync_time.map_or(true, |current| current < time) {
            watermark.last_sync_time = Some(time);
            return Ok(true);
        }
        Ok(false)
    }

    async fn record_module(&self, name: &str) -> Result<(), WatermarkError> {
        let mut guard = self.watermark.write().await;
        let Some(watermark) = guard.as_mut() else {
            return Err(WatermarkError::NotFound);
        };

        self.modules.write().await.push(name.to_string());
        watermark.last_sync_module = Some(name.to_string());
        Ok(())
    }
}
