//! In-memory status board.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::worker::WorkerProgress;

use super::{StatusReporter, SyncStatus};

struct ActiveRun {
    status: SyncStatus,
    started_at: DateTime<Utc>,
    progress: watch::Receiver<WorkerProgress>,
}

/// Point-in-time view of the most recent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub need: usize,
    pub started_at: DateTime<Utc>,
    pub progress: WorkerProgress,
}

/// Keeps the latest run's progress for status queries.
#[derive(Default)]
pub struct StatusBoard {
    current: RwLock<Option<ActiveRun>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress of the most recent run, if any run has started.
    pub fn snapshot(&self) -> Option<StatusSnapshot> {
        let current = self.current.read().ok()?;
        current.as_ref().map(|run| StatusSnapshot {
            need: run.status.need,
            started_at: run.started_at,
            progress: run.progress.borrow().clone(),
        })
    }
}

impl StatusReporter for StatusBoard {
    fn run_started(&self, status: SyncStatus, progress: watch::Receiver<WorkerProgress>) {
        info!("Sync status: {} packages needed", status.need);
        if let Ok(mut current) = self.current.write() {
            *current = Some(ActiveRun {
                status,
                started_at: Utc::now(),
                progress,
            });
        }
    }
}
