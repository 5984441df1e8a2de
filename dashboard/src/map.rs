use basket_shared::{Basket, LatLng, Order, Region};

use crate::config::{MAP_CENTER, MAP_ZOOM, TILE_ATTRIBUTION, TILE_URL};

pub const BASKET_ORDER_RADIUS_M: f64 = 15.0;
pub const STANDALONE_ORDER_RADIUS_M: f64 = 20.0;

/// Tile map the scene is drawn onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            tile_url: TILE_URL,
            attribution: TILE_ATTRIBUTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub key: String,
    pub positions: Vec<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleKind {
    Basket,
    BasketOrder,
    Order,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleShape {
    pub key: String,
    pub kind: CircleKind,
    pub center: LatLng,
    pub radius_m: f64,
    pub popup: Vec<String>,
}

/// Shapes handed to the map surface, all in latitude/longitude order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapScene {
    pub polygons: Vec<PolygonShape>,
    pub circles: Vec<CircleShape>,
}

impl MapScene {
    pub fn count(&self, kind: CircleKind) -> usize {
        self.circles.iter().filter(|c| c.kind == kind).count()
    }
}

/// Project the selection, orders and baskets onto the map. Orders are drawn on
/// their own only while there are no baskets; otherwise they appear inside
/// the basket that holds them.
pub fn project(selection: &[Region], orders: &[Order], baskets: &[Basket]) -> MapScene {
    let polygons = selection
        .iter()
        .flat_map(|region| {
            region
                .outlines()
                .into_iter()
                .enumerate()
                .map(move |(index, positions)| PolygonShape {
                    key: format!("{}-{index}", region.name),
                    positions,
                })
        })
        .collect();

    let mut circles = Vec::new();
    if baskets.is_empty() {
        circles.extend(orders.iter().enumerate().map(|(index, order)| CircleShape {
            key: format!("order-{index}"),
            kind: CircleKind::Order,
            center: order.position(),
            radius_m: STANDALONE_ORDER_RADIUS_M,
            popup: vec![
                "Coordinates".to_string(),
                format!("Latitude: {:.6}", order.latitude),
                format!("Longitude: {:.6}", order.longitude),
            ],
        }));
    } else {
        for (index, basket) in baskets.iter().enumerate() {
            circles.push(basket_circle(index, basket));
            circles.extend(basket.orders.iter().enumerate().map(|(order_index, order)| {
                CircleShape {
                    key: format!("basket-{index}-order-{order_index}"),
                    kind: CircleKind::BasketOrder,
                    center: order.position(),
                    radius_m: BASKET_ORDER_RADIUS_M,
                    popup: vec![
                        "Order in Basket".to_string(),
                        format!("Latitude: {:.6}", order.latitude),
                        format!("Longitude: {:.6}", order.longitude),
                    ],
                }
            }));
        }
    }

    MapScene { polygons, circles }
}

fn basket_circle(index: usize, basket: &Basket) -> CircleShape {
    CircleShape {
        key: format!("basket-{index}"),
        kind: CircleKind::Basket,
        center: basket.center(),
        radius_m: basket.radius_meters(),
        popup: vec![
            format!("Orders: {}", basket.orders.len()),
            format!("Radius: {} km", basket.diameter_km()),
            "Center:".to_string(),
            format!("Latitude: {:.6}", basket.latitude),
            format!("Longitude: {:.6}", basket.longitude),
        ],
    }
}
