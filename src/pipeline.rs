//! Order-to-trip assignment pipeline.
//!
//! Two solve stages chained: every (order, trip) pair is costed by routing
//! the order's pickup through the trip's stops to the order's dropoff with
//! the TSP formulator, then the resulting cost matrix feeds the assignment
//! model. Pair costings are independent, so they run in parallel.

use rayon::prelude::*;

use crate::assignment::{Assignment, AssignmentProblem};
use crate::error::SolveError;
use crate::matrix::DistanceMatrix;
use crate::tsp::solve_tsp;

/// A delivery order: where it is picked up and dropped off, and how much
/// of a trip's capacity it consumes.
#[derive(Debug, Clone)]
pub struct Order {
    pub pickup: (f64, f64),
    pub dropoff: (f64, f64),
    pub weight: f64,
    pub cbm: f64,
}

/// A planned trip: its existing stops and remaining capacity.
#[derive(Debug, Clone)]
pub struct Trip {
    pub waypoints: Vec<(f64, f64)>,
    pub max_weight: f64,
    pub max_cbm: f64,
}

/// Cost of inserting one order into one trip: the optimal route
/// pickup -> trip stops -> dropoff, on unscaled distances.
fn pair_cost(order: &Order, trip: &Trip) -> Result<f64, SolveError> {
    let mut route = Vec::with_capacity(trip.waypoints.len() + 2);
    route.push(order.pickup);
    route.extend_from_slice(&trip.waypoints);
    route.push(order.dropoff);

    let matrix = DistanceMatrix::unscaled(&route);
    let solution = solve_tsp(&matrix)?;
    Ok(solution.total as f64)
}

/// Assign every order to a trip, costing each pairing by its TSP detour.
pub fn assign_orders(orders: &[Order], trips: &[Trip]) -> Result<Vec<Assignment>, SolveError> {
    if orders.is_empty() {
        return Err(SolveError::InvalidInput("no orders to assign".into()));
    }
    if trips.is_empty() {
        return Err(SolveError::InvalidInput("no trips to assign to".into()));
    }

    let costs: Vec<Vec<f64>> = orders
        .par_iter()
        .map(|order| trips.iter().map(|trip| pair_cost(order, trip)).collect())
        .collect::<Result<_, _>>()?;
    tracing::debug!(
        orders = orders.len(),
        trips = trips.len(),
        "pair costing finished"
    );

    let problem = AssignmentProblem {
        costs,
        order_weights: orders.iter().map(|order| order.weight).collect(),
        order_cbms: orders.iter().map(|order| order.cbm).collect(),
        max_weights: trips.iter().map(|trip| trip.max_weight).collect(),
        max_cbms: trips.iter().map(|trip| trip.max_cbm).collect(),
    };
    problem.assign()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(pickup: (f64, f64), dropoff: (f64, f64)) -> Order {
        Order {
            pickup,
            dropoff,
            weight: 1.0,
            cbm: 1.0,
        }
    }

    fn trip(waypoint: (f64, f64)) -> Trip {
        Trip {
            waypoints: vec![waypoint],
            max_weight: 1.0,
            max_cbm: 10.0,
        }
    }

    #[test]
    fn orders_land_on_their_nearby_trips() {
        // One order and trip around Las Vegas, the other pair around LA;
        // unit trip capacity forces one order per trip.
        let orders = [
            order((36.12, -115.16), (36.10, -115.17)),
            order((34.05, -118.24), (34.07, -118.26)),
        ];
        let trips = [
            trip((36.11, -115.15)),
            trip((34.06, -118.25)),
        ];
        let assignments = assign_orders(&orders, &trips).expect("feasible");
        assert!(assignments.contains(&Assignment { order: 0, trip: 0 }));
        assert!(assignments.contains(&Assignment { order: 1, trip: 1 }));
    }

    #[test]
    fn empty_trip_list_is_rejected() {
        let orders = [order((36.12, -115.16), (36.10, -115.17))];
        assert!(matches!(
            assign_orders(&orders, &[]),
            Err(SolveError::InvalidInput(_))
        ));
    }

    #[test]
    fn trip_without_waypoints_fails_problem_size() {
        let orders = [order((36.12, -115.16), (36.10, -115.17))];
        let trips = [Trip {
            waypoints: vec![],
            max_weight: 5.0,
            max_cbm: 5.0,
        }];
        assert_eq!(
            assign_orders(&orders, &trips),
            Err(SolveError::InvalidProblemSize(2))
        );
    }
}
