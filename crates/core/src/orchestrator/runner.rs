//! Sync orchestrator implementation.
//!
//! Drives a single run through its phases. Each step awaits one remote call
//! before the next starts; there is no parallelism inside a run. Callers must
//! not start overlapping runs against the same watermark.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::metrics::{RUN_DURATION, SYNC_RUNS, WATERMARK_ADVANCES};
use crate::planner::SyncPlanner;
use crate::status::{StatusReporter, SyncStatus};
use crate::watermark::{SyncMode, WatermarkStore};
use crate::worker::{SyncJob, WorkerDriver};

use super::config::SyncConfig;
use super::types::{OrchestratorStatus, RunOutcome, RunPhase, RunResult, RunSummary, SyncError};

/// The sync orchestrator - runs the planner and worker and owns the watermark.
pub struct SyncOrchestrator {
    config: SyncConfig,
    watermark_store: Arc<dyn WatermarkStore>,
    planner: SyncPlanner,
    worker: Arc<dyn WorkerDriver>,
    status_reporter: Option<Arc<dyn StatusReporter>>,

    // Runtime state
    phase: RwLock<RunPhase>,
    last_run: RwLock<Option<RunSummary>>,
}

impl SyncOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: SyncConfig,
        watermark_store: Arc<dyn WatermarkStore>,
        planner: SyncPlanner,
        worker: Arc<dyn WorkerDriver>,
    ) -> Self {
        Self {
            config,
            watermark_store,
            planner,
            worker,
            status_reporter: None,
            phase: RwLock::new(RunPhase::Idle),
            last_run: RwLock::new(None),
        }
    }

    /// Set a reporter notified when a run starts syncing.
    pub fn with_status_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.status_reporter = Some(reporter);
        self
    }

    /// Get current orchestrator status.
    pub async fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            phase: *self.phase.read().await,
            last_run: self.last_run.read().await.clone(),
        }
    }

    /// Execute one sync run.
    pub async fn run(&self) -> Result<RunResult, SyncError> {
        let run_id = Uuid::new_v4();
        let run_start = Utc::now();
        let timer = Instant::now();

        let result = self.execute(run_id, run_start).await;

        let outcome = match &result {
            Ok(run) => run.outcome(),
            Err(_) => RunOutcome::Failed,
        };
        SYNC_RUNS.with_label_values(&[outcome.as_str()]).inc();
        RUN_DURATION
            .with_label_values(&[outcome.as_str()])
            .observe(timer.elapsed().as_secs_f64());

        let summary = match &result {
            Ok(run) => RunSummary {
                run_id,
                started_at: run_start,
                finished_at: Utc::now(),
                outcome,
                successes: run.successes.len(),
                fails: run.fails.len(),
                failed_packages: run.fails.clone(),
                error: None,
            },
            Err(e) => {
                error!("Sync run {} aborted: {}", run_id, e);
                RunSummary {
                    run_id,
                    started_at: run_start,
                    finished_at: Utc::now(),
                    outcome,
                    successes: 0,
                    fails: 0,
                    failed_packages: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        *self.last_run.write().await = Some(summary);
        self.set_phase(RunPhase::Done).await;

        result
    }

    async fn execute(&self, run_id: Uuid, run_start: DateTime<Utc>) -> Result<RunResult, SyncError> {
        self.set_phase(RunPhase::Planning).await;

        let watermark = self.watermark_store.read().await?;
        match watermark.last_sync_time {
            Some(time) => info!("Sync run {}: last sync time {}", run_id, time),
            None => info!("Sync run {}: never synced before", run_id),
        }

        let plan = self.planner.compute_batch(&watermark).await?;
        if plan.is_empty() {
            info!("No packages need to be synced");
            return Ok(RunResult::empty(run_id, run_start, plan.mode));
        }

        let mode = plan.mode;
        let need = plan.packages.len();
        info!("Total {} packages to sync ({} mode)", need, mode);
        debug!("Packages to sync: {:?}", plan.packages);

        self.set_phase(RunPhase::Syncing).await;
        let job = SyncJob {
            names: plan.packages,
            actor: self.config.actor.clone(),
            no_deps: true,
            concurrency: self.config.concurrency,
            sync_upstream_first: false,
            record_checkpoints: mode == SyncMode::Bootstrap,
        };

        let handle = self.worker.submit(job).await?;
        if let Some(ref reporter) = self.status_reporter {
            reporter.run_started(SyncStatus { need }, handle.progress());
        }
        let report = handle.wait().await?;

        info!(
            "All packages sync done, successes {}, fails {}",
            report.successes.len(),
            report.fails.len()
        );

        self.set_phase(RunPhase::Finalizing).await;
        let watermark_advanced = if report.fails.is_empty() {
            let advanced = self.watermark_store.write(run_start).await?;
            if advanced {
                WATERMARK_ADVANCES.inc();
                info!("Watermark advanced to {}", run_start);
            } else {
                warn!("Watermark already at or past {}, left unchanged", run_start);
            }
            advanced
        } else {
            warn!(
                "{} packages failed, watermark left unchanged: {:?}",
                report.fails.len(),
                report.fails
            );
            false
        };

        Ok(RunResult {
            run_id,
            started_at: run_start,
            mode,
            successes: report.successes,
            fails: report.fails,
            watermark_advanced,
        })
    }

    async fn set_phase(&self, phase: RunPhase) {
        debug!("Sync phase -> {:?}", phase);
        *self.phase.write().await = phase;
    }
}
