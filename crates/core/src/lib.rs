pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod package_store;
pub mod planner;
pub mod registry;
pub mod status;
pub mod testing;
pub mod watermark;
pub mod worker;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    RegistryConfig, SchedulerConfig, ServerConfig,
};
pub use orchestrator::{
    OrchestratorStatus, RunOutcome, RunPhase, RunResult, RunSummary, SyncConfig, SyncError,
    SyncOrchestrator,
};
pub use package_store::{PackageRecord, PackageStore, PackageStoreError, SqlitePackageStore};
pub use planner::{PlannerConfig, SyncPlan, SyncPlanner};
pub use registry::{ChangeFeed, ChangeRecord, HttpRegistryClient, RegistryClient, RegistryError};
pub use status::{StatusBoard, StatusReporter, StatusSnapshot, SyncStatus};
pub use watermark::{SqliteWatermarkStore, SyncMode, Watermark, WatermarkError, WatermarkStore};
pub use worker::{
    PackageSyncWorker, PackageSyncer, RegistryPackageSyncer, SyncHandle, SyncJob, WorkerDriver,
    WorkerError, WorkerProgress, WorkerReport,
};
