//! Bounded-concurrency sync worker.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info, warn};

use crate::metrics::PACKAGES_SYNCED;
use crate::watermark::WatermarkStore;

use super::syncer::{PackageSyncContext, PackageSyncError, PackageSyncer, SyncedPackage};
use super::types::{SyncHandle, SyncJob, WorkerError, WorkerProgress, WorkerReport};
use super::WorkerDriver;

/// Runs a [`PackageSyncer`] over each job's packages, at most
/// `job.concurrency` at a time.
pub struct PackageSyncWorker {
    syncer: Arc<dyn PackageSyncer>,
    checkpoints: Option<Arc<dyn WatermarkStore>>,
}

impl PackageSyncWorker {
    pub fn new(syncer: Arc<dyn PackageSyncer>) -> Self {
        Self {
            syncer,
            checkpoints: None,
        }
    }

    /// Store used to record bootstrap checkpoints for jobs that ask for them.
    pub fn with_checkpoints(mut self, store: Arc<dyn WatermarkStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }
}

#[async_trait]
impl WorkerDriver for PackageSyncWorker {
    async fn submit(&self, job: SyncJob) -> Result<SyncHandle, WorkerError> {
        if job.concurrency == 0 {
            return Err(WorkerError::InvalidJob(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let (progress_tx, progress_rx) = watch::channel(WorkerProgress {
            total: job.names.len(),
            ..Default::default()
        });
        let (done_tx, done_rx) = oneshot::channel();

        let syncer = Arc::clone(&self.syncer);
        let checkpoints = if job.record_checkpoints {
            self.checkpoints.clone()
        } else {
            None
        };

        debug!(
            "Accepted sync job: {} packages, concurrency {}, actor {}, no_deps {}, upstream_first {}",
            job.names.len(),
            job.concurrency,
            job.actor,
            job.no_deps,
            job.sync_upstream_first
        );

        tokio::spawn(async move {
            let report = run_job(job, syncer, checkpoints, progress_tx).await;
            if done_tx.send(report).is_err() {
                warn!("Sync job finished but nobody is waiting for the report");
            }
        });

        Ok(SyncHandle::new(progress_rx, done_rx))
    }
}

/// Tracks the contiguous prefix of the batch that synced successfully.
struct Checkpoint {
    batch: Vec<String>,
    synced: Vec<bool>,
    prefix: usize,
}

impl Checkpoint {
    fn new(batch: Vec<String>) -> Self {
        let synced = vec![false; batch.len()];
        Self {
            batch,
            synced,
            prefix: 0,
        }
    }

    /// Mark `idx` synced. Returns the new prefix end if it moved.
    fn mark(&mut self, idx: usize) -> Option<&str> {
        self.synced[idx] = true;
        let before = self.prefix;
        while self.prefix < self.synced.len() && self.synced[self.prefix] {
            self.prefix += 1;
        }
        (self.prefix > before).then(|| self.batch[self.prefix - 1].as_str())
    }
}

async fn run_job(
    job: SyncJob,
    syncer: Arc<dyn PackageSyncer>,
    checkpoints: Option<Arc<dyn WatermarkStore>>,
    progress_tx: watch::Sender<WorkerProgress>,
) -> WorkerReport {
    let ctx = Arc::new(PackageSyncContext {
        actor: job.actor.clone(),
        sync_upstream_first: job.sync_upstream_first,
    });

    let mut seen: HashSet<String> = job.names.iter().cloned().collect();
    let mut queue: VecDeque<(Option<usize>, String)> = job
        .names
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, name)| (Some(idx), name))
        .collect();
    let mut checkpoint = checkpoints
        .as_ref()
        .map(|_| Checkpoint::new(job.names.clone()));

    let mut report = WorkerReport::default();
    let mut tasks: JoinSet<Result<SyncedPackage, PackageSyncError>> = JoinSet::new();
    // Names stay outside the tasks so a panicked task is still accounted for.
    let mut in_flight: HashMap<Id, (Option<usize>, String)> = HashMap::new();

    loop {
        while tasks.len() < job.concurrency {
            let Some((idx, name)) = queue.pop_front() else {
                break;
            };
            let syncer = Arc::clone(&syncer);
            let ctx = Arc::clone(&ctx);
            let task_name = name.clone();
            let handle =
                tasks.spawn(async move { syncer.sync_package(&task_name, &ctx).await });
            in_flight.insert(handle.id(), (idx, name));
        }

        let Some(joined) = tasks.join_next_with_id().await else {
            break;
        };

        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => {
                error!("Sync task panicked or was cancelled: {}", e);
                (e.id(), Err(PackageSyncError::Aborted(e.to_string())))
            }
        };
        let Some((idx, name)) = in_flight.remove(&id) else {
            error!("Finished sync task {} has no package attached", id);
            continue;
        };

        match outcome {
            Ok(synced) => {
                if synced.removed {
                    info!("[{}] gone upstream, dropped from mirror", name);
                    PACKAGES_SYNCED.with_label_values(&["removed"]).inc();
                } else {
                    debug!("[{}] sync success", name);
                    PACKAGES_SYNCED.with_label_values(&["success"]).inc();
                }

                if !job.no_deps {
                    for dep in synced.dependencies {
                        if seen.insert(dep.clone()) {
                            queue.push_back((None, dep));
                            progress_tx.send_modify(|p| p.total += 1);
                        }
                    }
                }

                if let (Some(idx), Some(checkpoint), Some(store)) =
                    (idx, checkpoint.as_mut(), checkpoints.as_ref())
                {
                    if let Some(module) = checkpoint.mark(idx) {
                        if let Err(e) = store.record_module(module).await {
                            warn!("Failed to record bootstrap checkpoint {}: {}", module, e);
                        }
                    }
                }

                report.successes.push(name);
                progress_tx.send_modify(|p| p.successes += 1);
            }
            Err(e) => {
                warn!("[{}] sync failed: {}", name, e);
                PACKAGES_SYNCED.with_label_values(&["failed"]).inc();
                report.fails.push(name);
                progress_tx.send_modify(|p| p.fails += 1);
            }
        }
    }

    report
}
