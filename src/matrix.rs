//! Pairwise distance matrices for a location set.
//!
//! Built once per request and read-only afterwards. Storage is a flat
//! row-major vector addressed by `i * n + j`. The `cost` accessor
//! truncates to integers for engines that only take integer edge costs.

use crate::haversine::{haversine_km, road_km};

/// Dense n×n distance matrix in kilometers.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Build from raw haversine distances (TSP and assignment costing).
    pub fn unscaled(locations: &[(f64, f64)]) -> Self {
        Self::build(locations, haversine_km)
    }

    /// Build from road-scaled distances (vehicle costing, matrix endpoint).
    pub fn road(locations: &[(f64, f64)]) -> Self {
        Self::build(locations, road_km)
    }

    fn build(locations: &[(f64, f64)], distance: fn((f64, f64), (f64, f64)) -> f64) -> Self {
        let size = locations.len();
        let mut data = Vec::with_capacity(size * size);
        for &from in locations {
            for &to in locations {
                data.push(distance(from, to));
            }
        }
        Self { size, data }
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance in kilometers.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Distance truncated to whole kilometers, for integer-cost engines.
    pub fn cost(&self, from: usize, to: usize) -> i64 {
        self.get(from, to) as i64
    }

    /// The matrix as nested rows, the shape the wire layer serializes.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.size)
            .map(|from| (0..self.size).map(|to| self.get(from, to)).collect())
            .collect()
    }
}
