//! Periodic and on-demand sync runs.
//!
//! A run holds the run lock for its whole duration, so scheduled ticks and
//! manual triggers never overlap against the same watermark.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use mirror_sync_core::{SchedulerConfig, SyncOrchestrator};

/// A run is already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerBusy;

/// Owns the run lock and the periodic run loop.
pub struct SyncScheduler {
    config: SchedulerConfig,
    orchestrator: Arc<SyncOrchestrator>,
    run_lock: Arc<Mutex<()>>,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncScheduler {
    pub fn new(config: SchedulerConfig, orchestrator: Arc<SyncOrchestrator>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            orchestrator,
            run_lock: Arc::new(Mutex::new(())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Whether a sync run currently holds the run lock.
    pub fn is_busy(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Start a run in the background unless one is already active.
    pub fn trigger(&self) -> Result<JoinHandle<()>, SchedulerBusy> {
        let guard = Arc::clone(&self.run_lock)
            .try_lock_owned()
            .map_err(|_| SchedulerBusy)?;
        let orchestrator = Arc::clone(&self.orchestrator);
        Ok(tokio::spawn(run_locked(orchestrator, guard)))
    }

    /// Spawn the periodic loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Scheduler already running");
            return;
        }

        let run_on_start = self.config.run_on_start;
        let interval = (self.config.interval_secs > 0)
            .then(|| Duration::from_secs(self.config.interval_secs));
        let orchestrator = Arc::clone(&self.orchestrator);
        let run_lock = Arc::clone(&self.run_lock);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        match interval {
            Some(interval) => info!("Scheduler started, interval {:?}", interval),
            None => info!("Scheduler started, periodic runs disabled"),
        }

        tokio::spawn(async move {
            if run_on_start {
                tick(&orchestrator, &run_lock).await;
            }

            let Some(interval) = interval else {
                return;
            };

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        tick(&orchestrator, &run_lock).await;
                    }
                }
            }
            info!("Scheduler stopped");
        });
    }

    /// Stop the periodic loop. A run already in progress finishes on its own.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(());
    }
}

async fn tick(orchestrator: &Arc<SyncOrchestrator>, run_lock: &Arc<Mutex<()>>) {
    match Arc::clone(run_lock).try_lock_owned() {
        Ok(guard) => run_locked(Arc::clone(orchestrator), guard).await,
        Err(_) => info!("Previous sync run still active, skipping scheduled run"),
    }
}

async fn run_locked(orchestrator: Arc<SyncOrchestrator>, _guard: OwnedMutexGuard<()>) {
    match orchestrator.run().await {
        Ok(result) => info!(
            "Sync run {} finished: {} successes, {} fails, watermark advanced: {}",
            result.run_id,
            result.successes.len(),
            result.fails.len(),
            result.watermark_advanced
        ),
        // Retried on the next tick.
        Err(e) => error!("Sync run failed: {}", e),
    }
}
