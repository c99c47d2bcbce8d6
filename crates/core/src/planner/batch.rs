//! Batch computation from a watermark.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::registry::{ChangeFeed, RegistryClient, RegistryError, FEED_UPDATED_KEY};
use crate::watermark::{SyncMode, Watermark};

use super::config::PlannerConfig;

/// Packages selected for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub mode: SyncMode,
    pub packages: Vec<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Computes which packages a run has to sync.
pub struct SyncPlanner {
    config: PlannerConfig,
    registry: Arc<dyn RegistryClient>,
}

impl SyncPlanner {
    pub fn new(config: PlannerConfig, registry: Arc<dyn RegistryClient>) -> Self {
        Self { config, registry }
    }

    /// Compute the batch for `watermark`.
    ///
    /// Only registry failures are reported as errors; "nothing to do" is an
    /// empty plan.
    pub async fn compute_batch(&self, watermark: &Watermark) -> Result<SyncPlan, RegistryError> {
        let mode = watermark.mode();
        let packages = match watermark.last_sync_time {
            None => {
                info!("First time sync, listing all packages from upstream registry");
                let listing = self.registry.list_all().await?;
                resume_listing(listing, watermark.last_sync_module.as_deref())
            }
            Some(last_sync_time) => {
                let since = self.query_start(last_sync_time);
                debug!(
                    "Querying upstream changes since {} (watermark {})",
                    since, last_sync_time
                );
                project_changes(self.registry.changed_since(since).await?)
            }
        };

        Ok(SyncPlan { mode, packages })
    }

    /// Watermark shifted back by the skew window, clamped at the earliest
    /// representable time.
    fn query_start(&self, last_sync_time: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.config.skew())
            .ok()
            .and_then(|skew| last_sync_time.checked_sub_signed(skew))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Resume a bootstrap listing after `last_module`.
///
/// - no module recorded: the full listing
/// - module at index `i`: everything after it (`listing[i + 1..]`)
/// - module is the last entry: that entry alone, so the run still has work
///   and can finish the bootstrap by writing the watermark
/// - module not in the listing: the full listing again
pub fn resume_listing(mut listing: Vec<String>, last_module: Option<&str>) -> Vec<String> {
    let Some(module) = last_module else {
        return listing;
    };

    match listing.iter().position(|name| name == module) {
        Some(idx) if idx + 1 == listing.len() => {
            info!(
                "Bootstrap checkpoint {} is the last listed package, resyncing it to finish",
                module
            );
            listing.split_off(idx)
        }
        Some(idx) => {
            info!(
                "Resuming bootstrap after {} ({} of {} packages remaining)",
                module,
                listing.len() - idx - 1,
                listing.len()
            );
            listing.split_off(idx + 1)
        }
        None => {
            warn!(
                "Last synced module {} not found upstream, resyncing full listing of {} packages",
                module,
                listing.len()
            );
            listing
        }
    }
}

/// Project an upstream change feed to package names.
///
/// List form keeps order and duplicates. Mapping form drops the bookkeeping
/// key and yields the remaining keys in map order.
pub fn project_changes(feed: Option<ChangeFeed>) -> Vec<String> {
    match feed {
        None => Vec::new(),
        Some(ChangeFeed::Records(records)) => records.into_iter().map(|r| r.name).collect(),
        Some(ChangeFeed::Mapping(map)) => map
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| name != FEED_UPDATED_KEY)
            .collect(),
    }
}
