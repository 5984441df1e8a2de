use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::http::{ApiClient, FetchError};
use crate::state::{DashboardState, Notification};

pub const CREATE_ORDERS_FAILED: &str = "Failed to create orders";
pub const CREATE_BASKETS_FAILED: &str = "Failed to create baskets";

pub const CREATING_LABEL: &str = "Creating...";
pub const CREATE_ORDERS_LABEL: &str = "Create Orders";
pub const CREATE_BASKETS_LABEL: &str = "Baskets";
pub const RESET_LABEL: &str = "Reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    EmptySelection,
    NoOrders,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Precondition failed; nothing was sent.
    Skipped(Precondition),
    /// Same action already in flight; nothing was sent.
    Suppressed,
    Applied { count: usize },
    /// Response arrived after a reset or a newer order set and was dropped.
    Discarded,
    Failed(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub enabled: bool,
    pub label: &'static str,
}

/// Enablement and labels of the action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub create_orders: Trigger,
    pub create_baskets: Trigger,
    pub reset: Trigger,
}

/// Claimed in-flight flag, released on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Coordinates order and basket creation against the shared stores.
///
/// Every request captures the current generation before it is sent; `reset`
/// and every applied order batch advance it. A completion carrying an older
/// generation is dropped, so a reset always wins over a late response and
/// baskets computed from a superseded order set never reach the store.
#[derive(Debug, Clone)]
pub struct Actions {
    state: DashboardState,
    client: ApiClient,
    order_count: Option<u32>,
    creating_orders: Arc<AtomicBool>,
    creating_baskets: Arc<AtomicBool>,
    generation: Arc<Mutex<u64>>,
}

impl Actions {
    pub fn new(state: DashboardState, client: ApiClient) -> Self {
        Self {
            state,
            client,
            order_count: None,
            creating_orders: Arc::new(AtomicBool::new(false)),
            creating_baskets: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_order_count(mut self, count: Option<u32>) -> Self {
        self.order_count = count;
        self
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn creating_orders(&self) -> bool {
        self.creating_orders.load(Ordering::Acquire)
    }

    pub fn creating_baskets(&self) -> bool {
        self.creating_baskets.load(Ordering::Acquire)
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the backend for orders inside the selected regions. On success the
    /// order store is replaced and the basket store cleared.
    pub async fn create_orders(&self) -> ActionOutcome {
        if self.state.selection.is_empty() {
            return ActionOutcome::Skipped(Precondition::EmptySelection);
        }
        let Some(_in_flight) = InFlight::claim(&self.creating_orders) else {
            debug!("order creation already in flight, ignoring trigger");
            return ActionOutcome::Suppressed;
        };

        // Inputs and generation are read together so a reset cannot land between them.
        let (issued, regions) = {
            let generation = self.lock_generation();
            (*generation, self.state.selection.values())
        };
        if regions.is_empty() {
            return ActionOutcome::Skipped(Precondition::EmptySelection);
        }
        let region_count = regions.len();
        let result = self.client.create_orders(regions, self.order_count).await;

        let mut generation = self.lock_generation();
        if *generation != issued {
            debug!(issued, current = *generation, "discarding stale order response");
            return ActionOutcome::Discarded;
        }
        match result {
            Ok(orders) => {
                let count = orders.len();
                *generation = generation.wrapping_add(1);
                self.state.orders.replace(orders);
                self.state.baskets.clear();
                info!(count, regions = region_count, "orders created");
                ActionOutcome::Applied { count }
            }
            Err(e) => {
                drop(generation);
                ActionOutcome::Failed(self.fail(CREATE_ORDERS_FAILED, &e))
            }
        }
    }

    /// Ask the backend to cluster the current orders into baskets.
    pub async fn create_baskets(&self) -> ActionOutcome {
        if self.state.orders.is_empty() {
            return ActionOutcome::Skipped(Precondition::NoOrders);
        }
        let Some(_in_flight) = InFlight::claim(&self.creating_baskets) else {
            debug!("basket creation already in flight, ignoring trigger");
            return ActionOutcome::Suppressed;
        };

        let (issued, orders) = {
            let generation = self.lock_generation();
            (*generation, self.state.orders.value())
        };
        if orders.is_empty() {
            return ActionOutcome::Skipped(Precondition::NoOrders);
        }
        let order_count = orders.len();
        let result = self.client.create_baskets(orders.to_vec()).await;

        let generation = self.lock_generation();
        if *generation != issued {
            debug!(issued, current = *generation, "discarding stale basket response");
            return ActionOutcome::Discarded;
        }
        match result {
            Ok(baskets) => {
                let count = baskets.len();
                self.state.baskets.replace(baskets);
                info!(count, orders = order_count, "baskets created");
                ActionOutcome::Applied { count }
            }
            Err(e) => {
                drop(generation);
                ActionOutcome::Failed(self.fail(CREATE_BASKETS_FAILED, &e))
            }
        }
    }

    /// Clear orders, baskets and the selection. Responses still in flight are
    /// discarded when they land.
    pub fn reset(&self) {
        let mut generation = self.lock_generation();
        *generation = generation.wrapping_add(1);
        self.state.orders.clear();
        self.state.baskets.clear();
        self.state.selection.clear();
        info!("dashboard reset");
    }

    pub fn controls(&self) -> Controls {
        let creating_orders = self.creating_orders();
        let creating_baskets = self.creating_baskets();
        let has_orders = !self.state.orders.is_empty();
        let has_baskets = !self.state.baskets.is_empty();

        Controls {
            create_orders: Trigger {
                enabled: !self.state.selection.is_empty() && !creating_orders,
                label: if creating_orders {
                    CREATING_LABEL
                } else {
                    CREATE_ORDERS_LABEL
                },
            },
            create_baskets: Trigger {
                enabled: has_orders && !creating_baskets,
                label: if creating_baskets {
                    CREATING_LABEL
                } else {
                    CREATE_BASKETS_LABEL
                },
            },
            reset: Trigger {
                enabled: has_orders || has_baskets,
                label: RESET_LABEL,
            },
        }
    }

    fn fail(&self, title: &str, error: &FetchError) -> Notification {
        let notification = Notification::new(title, error.message());
        warn!(
            action = title,
            status = error.status,
            description = %notification.description,
            "action failed"
        );
        self.state.notify(notification.clone());
        notification
    }
}
