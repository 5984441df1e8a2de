use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use basket_shared::{Region, sort_names};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;

use crate::store::Store;

/// Latest region list from the backend, refreshed by the region poller.
/// Read-only for everything else.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: Store<Region>,
    refreshed_at_ms: Arc<AtomicI64>,
    failed_refreshes: Arc<AtomicU64>,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> Arc<Vec<Region>> {
        self.regions.value()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<Region> {
        self.regions().iter().find(|region| region.name == name).cloned()
    }

    /// Region names in selector order.
    pub fn options(&self) -> Vec<String> {
        let mut names: Vec<String> = self.regions().iter().map(|r| r.name.clone()).collect();
        sort_names(&mut names);
        names
    }

    /// Replace the list with a fresh backend response. Names are the region
    /// identity, so later duplicates are dropped.
    pub fn apply(&self, regions: Vec<Region>) {
        let mut seen = HashSet::with_capacity(regions.len());
        let total = regions.len();
        let unique: Vec<Region> = regions
            .into_iter()
            .filter(|region| seen.insert(region.name.clone()))
            .collect();
        if unique.len() != total {
            warn!(
                dropped = total - unique.len(),
                "region list contained duplicate names"
            );
        }

        self.regions.replace(unique);
        self.refreshed_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn record_failure(&self) -> u64 {
        self.failed_refreshes.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn failed_refreshes(&self) -> u64 {
        self.failed_refreshes.load(Ordering::Relaxed)
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        match self.refreshed_at_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Region>>> {
        self.regions.subscribe()
    }
}
