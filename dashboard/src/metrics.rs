use std::collections::BTreeSet;

use basket_shared::Basket;

use crate::state::DashboardState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub orders: usize,
    pub baskets: usize,
}

impl Metrics {
    pub fn from_state(state: &DashboardState) -> Self {
        Self {
            orders: state.orders.len(),
            baskets: state.baskets.len(),
        }
    }

    /// The panel is hidden until there is something to count.
    pub fn visible(&self) -> bool {
        self.orders > 0 || self.baskets > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasketEntry {
    pub title: String,
    pub order_count: String,
    pub radius: String,
    pub orders: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub label: String,
    pub coordinates: String,
}

pub fn basket_list(baskets: &[Basket]) -> Vec<BasketEntry> {
    baskets
        .iter()
        .enumerate()
        .map(|(index, basket)| {
            let count = basket.orders.len();
            BasketEntry {
                title: format!("Basket {}", index + 1),
                order_count: format!("{count} {}", if count == 1 { "order" } else { "orders" }),
                radius: format!("Radius: {:.1} km", basket.diameter_km()),
                orders: basket
                    .orders
                    .iter()
                    .enumerate()
                    .map(|(order_index, order)| OrderLine {
                        label: format!("Order {}", order_index + 1),
                        coordinates: format!("{:.4}, {:.4}", order.latitude, order.longitude),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Which basket entries are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedBaskets(BTreeSet<usize>);

impl ExpandedBaskets {
    /// Flip one entry; returns whether it is now open.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.0.remove(&index) {
            false
        } else {
            self.0.insert(index);
            true
        }
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use basket_shared::Order;

    use super::*;

    #[test]
    fn metrics_count_both_stores() {
        let state = DashboardState::new();
        assert!(!Metrics::from_state(&state).visible());

        state.orders.replace(vec![Order::new(41.0, 29.0); 12]);
        let metrics = Metrics::from_state(&state);
        assert_eq!(metrics, Metrics { orders: 12, baskets: 0 });
        assert!(metrics.visible());
    }

    #[test]
    fn basket_entries_pluralize_and_round() {
        let baskets = vec![
            Basket {
                latitude: 41.0,
                longitude: 29.0,
                radius: 0.333,
                orders: vec![Order::new(41.012345, 29.054321)],
            },
            Basket {
                latitude: 41.1,
                longitude: 29.1,
                radius: 1.0,
                orders: vec![Order::new(41.1, 29.1), Order::new(41.2, 29.2)],
            },
        ];
        let entries = basket_list(&baskets);

        assert_eq!(entries[0].title, "Basket 1");
        assert_eq!(entries[0].order_count, "1 order");
        assert_eq!(entries[0].radius, "Radius: 0.7 km");
        assert_eq!(entries[0].orders[0].coordinates, "41.0123, 29.0543");
        assert_eq!(entries[1].order_count, "2 orders");
        assert_eq!(entries[1].orders[1].label, "Order 2");
    }

    #[test]
    fn toggle_flips_entries() {
        let mut expanded = ExpandedBaskets::default();
        assert!(expanded.toggle(2));
        assert!(expanded.is_open(2));
        assert!(!expanded.toggle(2));
        assert!(!expanded.is_open(2));
    }
}
