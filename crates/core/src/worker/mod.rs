//! Package sync workers.
//!
//! The orchestrator hands a [`SyncJob`] to a [`WorkerDriver`] and waits on the
//! returned [`SyncHandle`] for the single completion report. The bundled
//! [`PackageSyncWorker`] runs a [`PackageSyncer`] over the job's packages with
//! bounded concurrency.

mod pool;
mod syncer;
mod types;

pub use pool::PackageSyncWorker;
pub use syncer::{
    PackageSyncContext, PackageSyncError, PackageSyncer, RegistryPackageSyncer, SyncedPackage,
};
pub use types::{SyncHandle, SyncJob, WorkerError, WorkerProgress, WorkerReport};

use async_trait::async_trait;

/// Executes sync jobs.
#[async_trait]
pub trait WorkerDriver: Send + Sync {
    /// Start executing `job`. Returns once the job is accepted; completion is
    /// signalled through the handle.
    async fn submit(&self, job: SyncJob) -> Result<SyncHandle, WorkerError>;
}
