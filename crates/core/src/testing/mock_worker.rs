//! Mock worker driver for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{oneshot, watch, RwLock};

use crate::worker::{SyncHandle, SyncJob, WorkerDriver, WorkerError, WorkerProgress, WorkerReport};

/// Mock implementation of the WorkerDriver trait.
///
/// Completes every job immediately. Packages marked with
/// [`MockWorker::fail_package`] are reported as failures, everything else as
/// successes, preserving submission order.
#[derive(Debug)]
pub struct MockWorker {
    /// Recorded submissions.
    submitted: Arc<RwLock<Vec<SyncJob>>>,
    /// Packages that will be reported as failed.
    failing: Arc<RwLock<HashSet<String>>>,
    /// If set, the next submission will fail with this error.
    next_error: Arc<RwLock<Option<WorkerError>>>,
    /// Drop the completion channel of the next job without reporting.
    crash_next: Arc<RwLock<bool>>,
}

impl Default for MockWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWorker {
    /// Create a new mock worker.
    pub fn new() -> Self {
        Self {
            submitted: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            crash_next: Arc::new(RwLock::new(false)),
        }
    }

    /// Report `name` as failed in future jobs.
    pub async fn fail_package(&self, name: &str) {
        self.failing.write().await.insert(name.to_string());
    }

    /// Stop failing any package.
    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    /// Reject the next submission with `error`.
    pub async fn set_next_error(&self, error: WorkerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make the next job end without a completion signal.
    pub async fn crash_next(&self) {
        *self.crash_next.write().await = true;
    }

    /// Get all submitted jobs.
    pub async fn submitted_jobs(&self) -> Vec<SyncJob> {
        self.submitted.read().await.clone()
    }
}

#[async_trait]
impl WorkerDriver for MockWorker {
    async fn submit(&self, job: SyncJob) -> Result<SyncHandle, WorkerError> {
        self.submitted.write().await.push(job.clone());
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let failing = self.failing.read().await;
        let (fails, successes): (Vec<String>, Vec<String>) = job
            .names
            .iter()
            .cloned()
            .partition(|name| failing.contains(name));

        let (progress_tx, progress_rx) = watch::channel(WorkerProgress {
            total: job.names.len(),
            successes: successes.len(),
            fails: fails.len(),
        });
        let (done_tx, done_rx) = oneshot::channel();

        let crash = std::mem::take(&mut *self.crash_next.write().await);
        if crash {
            drop(done_tx);
        } else {
            let _ = done_tx.send(WorkerReport { successes, fails });
        }
        drop(progress_tx);

        Ok(SyncHandle::new(progress_rx, done_rx))
    }
}
