//! dispatch-planner core
//!
//! Formulates logistics optimization problems — vehicle routing,
//! order-to-trip assignment, TSP sub-route costing, fleet sizing, bin
//! packing, and min-cost flow — from request data and solves them through
//! the bundled optimization engine.

pub mod assignment;
pub mod binpack;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod haversine;
pub mod matrix;
pub mod mincost;
pub mod pipeline;
pub mod tsp;
pub mod vrp;
