//! Run progress reporting.
//!
//! Reporters are told how many packages a run needs and get a live view of
//! the worker's progress. They are observers only: nothing they do feeds back
//! into planning, submission or the watermark.

mod board;

pub use board::{StatusBoard, StatusSnapshot};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::worker::WorkerProgress;

/// What a run set out to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Packages the run needs to sync.
    pub need: usize,
}

/// Receives run start notifications.
pub trait StatusReporter: Send + Sync {
    fn run_started(&self, status: SyncStatus, progress: watch::Receiver<WorkerProgress>);
}
