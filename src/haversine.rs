//! Great-circle distances from latitude/longitude pairs.
//!
//! Two variants are exposed and both are load-bearing: the raw haversine
//! distance feeds the TSP and assignment cost matrices, while the
//! road-scaled variant (a fixed detour factor over the great circle)
//! feeds vehicle routing costs.

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6367.0;

/// Straight-line to road-network detour factor.
pub const ROAD_DETOUR_FACTOR: f64 = 1.4;

/// Haversine distance between two (lat, lng) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let s = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push s a hair outside [0, 1]; asin would reject it.
    let c = 2.0 * s.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Road distance estimate: haversine scaled by the detour factor.
pub fn road_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    haversine_km(from, to) * ROAD_DETOUR_FACTOR
}
