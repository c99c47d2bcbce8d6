//! Types shared between the orchestrator and worker drivers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{oneshot, watch};

/// Errors raised by a worker driver.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The job was rejected at submission.
    #[error("invalid sync job: {0}")]
    InvalidJob(String),

    /// The driver went away without reporting completion.
    #[error("worker stopped before reporting completion")]
    Crashed,
}

/// Work order for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJob {
    /// Packages to sync, in planner order.
    pub names: Vec<String>,
    /// Identity the sync runs as.
    pub actor: String,
    /// Do not expand the batch with dependencies of synced packages.
    pub no_deps: bool,
    /// Maximum packages synced at once.
    pub concurrency: usize,
    /// Consult a parent registry before the upstream one.
    pub sync_upstream_first: bool,
    /// Record bootstrap progress as the watermark resume pointer.
    pub record_checkpoints: bool,
}

/// Final per-package outcome of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub successes: Vec<String>,
    pub fails: Vec<String>,
}

/// Live progress of a running job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProgress {
    /// Packages known to the job so far (grows with dependency expansion).
    pub total: usize,
    pub successes: usize,
    pub fails: usize,
}

impl WorkerProgress {
    pub fn completed(&self) -> usize {
        self.successes + self.fails
    }
}

/// Handle to a submitted job.
#[derive(Debug)]
pub struct SyncHandle {
    progress: watch::Receiver<WorkerProgress>,
    completion: oneshot::Receiver<WorkerReport>,
}

impl SyncHandle {
    pub fn new(
        progress: watch::Receiver<WorkerProgress>,
        completion: oneshot::Receiver<WorkerReport>,
    ) -> Self {
        Self {
            progress,
            completion,
        }
    }

    /// Subscribe to progress updates.
    pub fn progress(&self) -> watch::Receiver<WorkerProgress> {
        self.progress.clone()
    }

    /// Wait for the job's single completion signal.
    pub async fn wait(self) -> Result<WorkerReport, WorkerError> {
        self.completion.await.map_err(|_| WorkerError::Crashed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_report() {
        let (_progress_tx, progress_rx) = watch::channel(WorkerProgress::default());
        let (done_tx, done_rx) = oneshot::channel();
        let handle = SyncHandle::new(progress_rx, done_rx);

        let report = WorkerReport {
            successes: vec!["a".to_string()],
            fails: vec!["b".to_string()],
        };
        done_tx.send(report.clone()).unwrap();

        assert_eq!(handle.wait().await.unwrap(), report);
    }

    #[tokio::test]
    async fn test_dropped_sender_is_crash() {
        let (_progress_tx, progress_rx) = watch::channel(WorkerProgress::default());
        let (done_tx, done_rx) = oneshot::channel::<WorkerReport>();
        let handle = SyncHandle::new(progress_rx, done_rx);

        drop(done_tx);

        assert!(matches!(handle.wait().await, Err(WorkerError::Crashed)));
    }

    #[test]
    fn test_progress_completed() {
        let progress = WorkerProgress {
            total: 10,
            successes: 3,
            fails: 2,
        };
        assert_eq!(progress.completed(), 5);
    }

    #[test]
    fn test_error_display() {
        let err = WorkerError::InvalidJob("concurrency must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid sync job: concurrency must be positive"
        );
    }
}
