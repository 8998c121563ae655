//! Order-to-trip assignment model.
//!
//! A boolean variable per (order, trip) pair, capacity rows per trip for
//! weight and volume, and an exactly-one-assignment rule expressed as
//! "at most one trip per order" plus "total assignments equals the order
//! count" — the pair the source protocol used.

use serde::{Deserialize, Serialize};

use crate::engine::mip::{LinExpr, MipModel, MipOutcome};
use crate::error::SolveError;

/// One order placed on one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub order: usize,
    pub trip: usize,
}

/// An order×trip assignment instance.
///
/// `costs` is dense, one row per order, one column per trip. Weights and
/// volumes are per order; the capacity arrays are per trip.
#[derive(Debug, Clone)]
pub struct AssignmentProblem {
    pub costs: Vec<Vec<f64>>,
    pub order_weights: Vec<f64>,
    pub order_cbms: Vec<f64>,
    pub max_weights: Vec<f64>,
    pub max_cbms: Vec<f64>,
}

impl AssignmentProblem {
    fn validate(&self) -> Result<(usize, usize), SolveError> {
        let num_orders = self.costs.len();
        if num_orders == 0 {
            return Err(SolveError::InvalidInput("no orders to assign".into()));
        }
        let num_trips = self.costs[0].len();
        if num_trips == 0 {
            return Err(SolveError::InvalidInput("no trips to assign to".into()));
        }
        if self.costs.iter().any(|row| row.len() != num_trips) {
            return Err(SolveError::InvalidInput("cost matrix is ragged".into()));
        }
        if self.order_weights.len() != num_orders || self.order_cbms.len() != num_orders {
            return Err(SolveError::InvalidInput(
                "order weights/cbms must match the number of orders".into(),
            ));
        }
        if self.max_weights.len() != num_trips || self.max_cbms.len() != num_trips {
            return Err(SolveError::InvalidInput(
                "trip capacities must match the number of trips".into(),
            ));
        }
        Ok((num_orders, num_trips))
    }

    /// Solve the assignment. Every order lands on exactly one trip or the
    /// instance is [`SolveError::Infeasible`].
    pub fn assign(&self) -> Result<Vec<Assignment>, SolveError> {
        let (num_orders, num_trips) = self.validate()?;

        let mut model = MipModel::new();
        // Dense variable grid, addressed order * num_trips + trip.
        let vars: Vec<_> = (0..num_orders * num_trips)
            .map(|_| model.bool_var())
            .collect();
        let var = |order: usize, trip: usize| vars[order * num_trips + trip];

        let mut objective = LinExpr::new();
        for (order, row) in self.costs.iter().enumerate() {
            for (trip, &cost) in row.iter().enumerate() {
                objective.add_term(var(order, trip), cost);
            }
        }
        model.minimize(objective);

        // Assigned weight within each trip's limit.
        for trip in 0..num_trips {
            let mut weight = LinExpr::new();
            for order in 0..num_orders {
                weight.add_term(var(order, trip), self.order_weights[order]);
            }
            model.add_le(weight, self.max_weights[trip]);
        }

        // Assigned volume within each trip's limit.
        for trip in 0..num_trips {
            let mut volume = LinExpr::new();
            for order in 0..num_orders {
                volume.add_term(var(order, trip), self.order_cbms[order]);
            }
            model.add_le(volume, self.max_cbms[trip]);
        }

        // Each order rides at most one trip...
        for order in 0..num_orders {
            let mut count = LinExpr::new();
            for trip in 0..num_trips {
                count.add_term(var(order, trip), 1.0);
            }
            model.add_le(count, 1.0);
        }

        // ...and all of them must be placed somewhere.
        let mut total = LinExpr::new();
        for &v in &vars {
            total.add_term(v, 1.0);
        }
        model.add_eq(total, num_orders as f64);

        match model.solve() {
            MipOutcome::Optimal(solution) => {
                tracing::debug!(
                    num_orders,
                    num_trips,
                    objective = solution.objective,
                    "assignment solved"
                );
                let mut assignments = Vec::with_capacity(num_orders);
                for order in 0..num_orders {
                    for trip in 0..num_trips {
                        if solution.value(var(order, trip)) > 0 {
                            assignments.push(Assignment { order, trip });
                        }
                    }
                }
                Ok(assignments)
            }
            MipOutcome::Infeasible | MipOutcome::Aborted => Err(SolveError::Infeasible),
        }
    }
}
