use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::region::LatLng;

/// Cluster of orders computed by the backend. `radius` is the half-width in km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Basket {
    pub const fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Negative radii are treated as zero.
    pub fn radius_km(&self) -> f64 {
        self.radius.max(0.0)
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_km() * 1000.0
    }

    pub fn diameter_km(&self) -> f64 {
        self.radius_km() * 2.0
    }
}

/// Body of `POST /api/baskets/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketsCreate {
    pub orders: Vec<Order>,
}
