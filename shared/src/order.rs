use serde::{Deserialize, Serialize};

use crate::region::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub latitude: f64,
    pub longitude: f64,
}

impl Order {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub const fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Body of `POST /api/orders/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersCreate {
    pub regions: Vec<String>,
    /// Orders to generate; the backend picks its own default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}
