use std::collections::HashSet;
use std::sync::Arc;

use basket_shared::Region;
use tokio::sync::watch;

use crate::catalog::RegionCatalog;
use crate::store::Store;

/// Regions the user is working with.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    regions: Store<Region>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with the catalog regions matching `names`, in the
    /// given order. Unknown and repeated names are dropped. Returns how many
    /// regions ended up selected.
    pub fn set_from_names<S: AsRef<str>>(&self, names: &[S], catalog: &RegionCatalog) -> usize {
        let available = catalog.regions();
        let mut seen = HashSet::new();
        let selected: Vec<Region> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| seen.insert(*name))
            .filter_map(|name| available.iter().find(|region| region.name == name).cloned())
            .collect();
        let count = selected.len();
        self.regions.replace(selected);
        count
    }

    pub fn values(&self) -> Vec<String> {
        self.regions.value().iter().map(|r| r.name.clone()).collect()
    }

    pub fn regions(&self) -> Arc<Vec<Region>> {
        self.regions.value()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&self) {
        self.regions.clear();
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Region>>> {
        self.regions.subscribe()
    }
}
