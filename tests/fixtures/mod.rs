//! Test fixtures for dispatch-planner.
//!
//! Real Chicago-area coordinates for depots and delivery stops, so the
//! distance math in tests runs over plausible urban geometry.

pub mod chicago_locations;

pub use chicago_locations::*;
