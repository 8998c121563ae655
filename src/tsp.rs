//! Single-route TSP costing.
//!
//! A route runs pickup -> trip stops -> dropoff. The final stop is
//! ambiguous in the source data: the last waypoint may have to be the
//! absolute last visit, or the second-to-last may close the route with the
//! last waypoint reordered into the middle. Both readings are solved and
//! the cheaper one wins.

use crate::engine::routing::{RoutingModel, SearchParams, TransitEvaluator};
use crate::error::SolveError;
use crate::matrix::DistanceMatrix;

/// A costed route: total integer cost and the visit order, both
/// endpoints included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TspSolution {
    pub total: i64,
    pub route: Vec<usize>,
}

struct MatrixCosts<'a>(&'a DistanceMatrix);

impl TransitEvaluator for MatrixCosts<'_> {
    fn transit(&self, from: usize, to: usize) -> i64 {
        self.0.cost(from, to)
    }
}

/// Solve both route-termination variants and keep the cheaper.
///
/// Variant A ends at the last waypoint, variant B at the second-to-last;
/// ties favor variant A. Fails with [`SolveError::InvalidProblemSize`]
/// below 3 stops and [`SolveError::Infeasible`] when neither variant has
/// a solution.
pub fn solve_tsp(matrix: &DistanceMatrix) -> Result<TspSolution, SolveError> {
    let size = matrix.len();
    if size <= 2 {
        return Err(SolveError::InvalidProblemSize(size));
    }

    let costs = MatrixCosts(matrix);
    let first = solve_variant(&costs, size, size - 1);
    let second = solve_variant(&costs, size, size - 2);

    match (first, second) {
        (Some(a), Some(b)) => Ok(if a.total <= b.total { a } else { b }),
        (Some(a), None) => Ok(a),
        (None, Some(b)) => Ok(b),
        (None, None) => Err(SolveError::Infeasible),
    }
}

/// One termination variant: a single vehicle from node 0 to `end`.
fn solve_variant(costs: &MatrixCosts<'_>, size: usize, end: usize) -> Option<TspSolution> {
    let mut model = RoutingModel::new(size, vec![0], vec![end]);
    model.set_arc_cost(costs);
    let solution = model.solve(&SearchParams::default())?;
    let route = solution
        .vehicle_route(0)
        .iter()
        .map(|stop| stop.node)
        .collect();
    Some(TspSolution {
        total: solution.objective,
        route,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_two_stops() {
        let matrix = DistanceMatrix::unscaled(&[(0.0, 0.0), (0.0, 1.0)]);
        assert_eq!(solve_tsp(&matrix), Err(SolveError::InvalidProblemSize(2)));
    }

    #[test]
    fn three_stop_route_visits_each_node_once() {
        let matrix = DistanceMatrix::unscaled(&[
            (36.1263781, -115.1658180),
            (36.1023654, -115.1688720),
            (36.1070664, -115.0591256),
        ]);
        let solution = solve_tsp(&matrix).expect("solvable");
        let mut nodes = solution.route.clone();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![0, 1, 2]);
        assert_eq!(solution.route[0], 0);
    }

    #[test]
    fn total_matches_the_returned_order() {
        let matrix = DistanceMatrix::unscaled(&[
            (36.1263781, -115.1658180),
            (36.1023654, -115.1688720),
            (36.1070664, -115.0591256),
            (36.0839998, -115.1537389),
        ]);
        let solution = solve_tsp(&matrix).expect("solvable");
        let recomputed: i64 = solution
            .route
            .windows(2)
            .map(|pair| matrix.cost(pair[0], pair[1]))
            .sum();
        assert_eq!(solution.total, recomputed);
    }

    #[test]
    fn picks_the_cheaper_termination_variant() {
        let matrix = DistanceMatrix::unscaled(&[
            (36.1263781, -115.1658180),
            (36.1023654, -115.1688720),
            (36.1070664, -115.0591256),
        ]);
        let solution = solve_tsp(&matrix).expect("solvable");

        // Variant A: 0 -> 1 -> 2; variant B: 0 -> 2 -> 1.
        let variant_a = matrix.cost(0, 1) + matrix.cost(1, 2);
        let variant_b = matrix.cost(0, 2) + matrix.cost(2, 1);
        assert_eq!(solution.total, variant_a.min(variant_b));
    }
}
