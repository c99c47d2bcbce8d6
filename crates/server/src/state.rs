use std::sync::Arc;

use mirror_sync_core::{Config, StatusBoard, SyncOrchestrator};

use crate::scheduler::SyncScheduler;

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<SyncOrchestrator>,
    scheduler: Arc<SyncScheduler>,
    status_board: Arc<StatusBoard>,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: Arc<SyncOrchestrator>,
        scheduler: Arc<SyncScheduler>,
        status_board: Arc<StatusBoard>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            scheduler,
            status_board,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &SyncOrchestrator {
        self.orchestrator.as_ref()
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        self.scheduler.as_ref()
    }

    pub fn status_board(&self) -> &StatusBoard {
        self.status_board.as_ref()
    }
}
