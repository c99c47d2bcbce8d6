//! Types for the sync orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::watermark::SyncMode;

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Watermark store error, including a missing watermark record.
    #[error("watermark store error: {0}")]
    Watermark(#[from] crate::watermark::WatermarkError),

    /// Upstream registry error while planning.
    #[error("registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    /// Worker rejected the job or stopped without reporting.
    #[error("worker error: {0}")]
    Worker(#[from] crate::worker::WorkerError),
}

/// Phase of the current (or last) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Planning,
    Syncing,
    Finalizing,
    Done,
}

/// Result of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,
    /// Captured before any I/O; becomes the watermark on full success.
    pub started_at: DateTime<Utc>,
    pub mode: SyncMode,
    pub successes: Vec<String>,
    pub fails: Vec<String>,
    pub watermark_advanced: bool,
}

impl RunResult {
    pub fn empty(run_id: Uuid, started_at: DateTime<Utc>, mode: SyncMode) -> Self {
        Self {
            run_id,
            started_at,
            mode,
            successes: Vec::new(),
            fails: Vec::new(),
            watermark_advanced: false,
        }
    }

    pub fn outcome(&self) -> RunOutcome {
        if !self.fails.is_empty() {
            RunOutcome::Partial
        } else if self.successes.is_empty() {
            RunOutcome::NoOp
        } else {
            RunOutcome::Success
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every package synced; watermark advanced.
    Success,
    /// Some packages failed; watermark kept.
    Partial,
    /// Nothing to sync.
    #[serde(rename = "noop")]
    NoOp,
    /// Aborted by a fatal error.
    Failed,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::Partial => "partial",
            RunOutcome::NoOp => "noop",
            RunOutcome::Failed => "failed",
        }
    }
}

/// Summary of the last finished run, kept for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub successes: usize,
    pub fails: usize,
    /// Failed package names (partial runs).
    pub failed_packages: Vec<String>,
    /// Error message (failed runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    pub phase: RunPhase,
    pub last_run: Option<RunSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(successes: &[&str], fails: &[&str]) -> RunResult {
        RunResult {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            mode: SyncMode::Incremental,
            successes: successes.iter().map(|s| s.to_string()).collect(),
            fails: fails.iter().map(|s| s.to_string()).collect(),
            watermark_advanced: false,
        }
    }

    #[test]
    fn test_outcome() {
        assert_eq!(result(&[], &[]).outcome(), RunOutcome::NoOp);
        assert_eq!(result(&["a"], &[]).outcome(), RunOutcome::Success);
        assert_eq!(result(&["a"], &["b"]).outcome(), RunOutcome::Partial);
        assert_eq!(result(&[], &["b"]).outcome(), RunOutcome::Partial);
    }

    #[test]
    fn test_status_default() {
        let status = OrchestratorStatus::default();
        assert_eq!(status.phase, RunPhase::Idle);
        assert!(status.last_run.is_none());
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&RunPhase::Finalizing).unwrap();
        assert_eq!(json, "\"finalizing\"");
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::from(crate::watermark::WatermarkError::NotFound);
        assert_eq!(
            err.to_string(),
            "watermark store error: watermark record not found"
        );

        let err = SyncError::from(crate::worker::WorkerError::Crashed);
        assert_eq!(
            err.to_string(),
            "worker error: worker stopped before reporting completion"
        );
    }
}
