use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::catalog::RegionCatalog;
use crate::http::ApiClient;

/// Keep the catalog fresh. Each refresh completes before the next tick is
/// taken, so responses can never land out of order; ticks missed while a
/// slow request was pending are skipped.
pub async fn run(client: ApiClient, catalog: RegionCatalog, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        refresh_once(&client, &catalog).await;
    }
}

/// One poll. A failure keeps the previous region list on display.
pub async fn refresh_once(client: &ApiClient, catalog: &RegionCatalog) -> bool {
    match client.fetch_regions().await {
        Ok(regions) => {
            debug!(count = regions.len(), "regions refreshed");
            catalog.apply(regions);
            true
        }
        Err(e) => {
            let failures = catalog.record_failure();
            warn!(
                status = e.status,
                failures,
                error = %e.message(),
                "failed to refresh regions; keeping previous list"
            );
            false
        }
    }
}
