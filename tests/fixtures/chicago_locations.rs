//! Real Chicago locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Distances between them are a
//! few kilometers, which keeps routing times small against day-length
//! shift windows.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Warehouses (depot candidates)
// ============================================================================

pub const DEPOTS: &[Location] = &[
    Location::new("Kinzie Industrial Corridor", 41.8890, -87.6640),
    Location::new("Pilsen Warehouse", 41.8560, -87.6560),
];

// ============================================================================
// Delivery stops around the Loop
// ============================================================================

pub const STOPS: &[Location] = &[
    Location::new("Willis Tower", 41.8789, -87.6359),
    Location::new("Merchandise Mart", 41.8885, -87.6354),
    Location::new("Art Institute", 41.8796, -87.6237),
    Location::new("Union Station", 41.8787, -87.6403),
    Location::new("Navy Pier", 41.8917, -87.6086),
    Location::new("Field Museum", 41.8663, -87.6170),
];
