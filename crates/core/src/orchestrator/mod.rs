//! Sync run orchestration.
//!
//! One run walks a fixed sequence of phases:
//! - **Planning**: read the watermark and compute the batch
//! - **Syncing**: submit the batch to the worker and wait for its report
//! - **Finalizing**: advance the watermark only if nothing failed

mod config;
mod runner;
mod types;

pub use config::SyncConfig;
pub use runner::SyncOrchestrator;
pub use types::{OrchestratorStatus, RunOutcome, RunPhase, RunResult, RunSummary, SyncError};
