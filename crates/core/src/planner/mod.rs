//! Sync planning.
//!
//! Turns the persisted watermark into the list of packages a run must sync:
//! - **Bootstrap**: the full upstream listing, resumed after the last module
//!   a previous bootstrap confirmed
//! - **Incremental**: packages changed upstream since the last successful run,
//!   widened by a clock-skew window

mod batch;
mod config;

pub use batch::{project_changes, resume_listing, SyncPlan, SyncPlanner};
pub use config::PlannerConfig;
