use basket_shared::{Basket, Order};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::catalog::RegionCatalog;
use crate::config::NOTIFICATION_BUFFER;
use crate::selection::Selection;
use crate::store::Store;

/// Transient user-facing message raised by a failed action.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            raised_at: Utc::now(),
        }
    }
}

/// Everything the views read. Built once per session and handed to each
/// consumer; clones share the same stores.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub orders: Store<Order>,
    pub baskets: Store<Basket>,
    pub catalog: RegionCatalog,
    pub selection: Selection,
    notification_tx: broadcast::Sender<Notification>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        let (notification_tx, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            orders: Store::new(),
            baskets: Store::new(),
            catalog: RegionCatalog::new(),
            selection: Selection::new(),
            notification_tx,
        }
    }

    pub fn notify(&self, notification: Notification) {
        // No subscribers just means nobody is showing toasts.
        let _ = self.notification_tx.send(notification);
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notification_tx.subscribe()
    }
}
