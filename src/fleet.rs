//! Fleet-size selection.
//!
//! For a demanded tonnage and a list of truck types (carrying weight and
//! cost per truck), choose how many of each type to dispatch. The chosen
//! fleet must cover the demand without overshooting it by a full truck of
//! the largest type, at minimum total cost. Each item of a request is an
//! independent solve.

use serde::{Deserialize, Serialize};

use crate::engine::mip::{LinExpr, MipModel, MipOutcome};
use crate::error::SolveError;

/// Upper bound on the count of any single truck type.
const MAX_TRUCKS_PER_TYPE: i64 = 1000;

/// One truck-type table: per-type carrying weights and costs.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetSizeItem {
    pub list_weights: Vec<i64>,
    pub costs: Vec<i64>,
}

/// A fleet-size request: one choice per item, all against one demand.
#[derive(Debug, Clone)]
pub struct FleetSizeProblem {
    pub items: Vec<FleetSizeItem>,
    pub demand: i64,
}

/// Chosen fleet for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetChoice {
    pub total_cost: i64,
    #[serde(rename = "list_result")]
    pub counts: Vec<i64>,
}

/// The `/mip` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetSizeRequest {
    pub array: Vec<FleetSizeItem>,
    pub demand: i64,
}

impl From<FleetSizeRequest> for FleetSizeProblem {
    fn from(request: FleetSizeRequest) -> Self {
        Self {
            items: request.array,
            demand: request.demand,
        }
    }
}

/// The `/mip` response body.
#[derive(Debug, Clone, Serialize)]
pub struct FleetSizeResponse {
    pub data: Vec<FleetChoice>,
}

impl FleetSizeProblem {
    /// Solve every item. A single infeasible item rejects the whole
    /// request, matching the source system.
    pub fn solve(&self) -> Result<Vec<FleetChoice>, SolveError> {
        self.items.iter().map(|item| self.solve_item(item)).collect()
    }

    fn solve_item(&self, item: &FleetSizeItem) -> Result<FleetChoice, SolveError> {
        let num_types = item.list_weights.len();
        if num_types == 0 {
            return Err(SolveError::InvalidInput("empty truck-type table".into()));
        }
        if item.costs.len() != num_types {
            return Err(SolveError::InvalidInput(
                "weights and costs must pair up per truck type".into(),
            ));
        }
        let heaviest = item.list_weights.iter().copied().max().unwrap_or(0);
        if heaviest <= 0 {
            return Err(SolveError::InvalidInput(
                "truck weights must be positive".into(),
            ));
        }

        let mut model = MipModel::new();
        let counts: Vec<_> = (0..num_types)
            .map(|_| model.int_var(0, MAX_TRUCKS_PER_TYPE))
            .collect();

        // Cover the demand, but stay under demand + one largest truck.
        let band_hi = self
            .demand
            .checked_add(heaviest)
            .ok_or(SolveError::Overflow)?;
        let mut carried = LinExpr::new();
        for (type_index, &weight) in item.list_weights.iter().enumerate() {
            carried.add_term(counts[type_index], weight as f64);
        }
        model.add_range(carried, self.demand as f64, (band_hi - 1) as f64);

        let mut cost = LinExpr::new();
        for (type_index, &unit_cost) in item.costs.iter().enumerate() {
            cost.add_term(counts[type_index], unit_cost as f64);
        }
        model.minimize(cost);

        match model.solve() {
            MipOutcome::Optimal(solution) => Ok(FleetChoice {
                total_cost: solution.objective as i64,
                counts: counts.iter().map(|&v| solution.value(v)).collect(),
            }),
            MipOutcome::Infeasible | MipOutcome::Aborted => Err(SolveError::Infeasible),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_demand_within_one_truck() {
        let problem = FleetSizeProblem {
            items: vec![FleetSizeItem {
                list_weights: vec![5, 3],
                costs: vec![10, 5],
            }],
            demand: 10,
        };
        let choices = problem.solve().expect("feasible");
        assert_eq!(choices.len(), 1);
        let carried = 5 * choices[0].counts[0] + 3 * choices[0].counts[1];
        assert!((10..15).contains(&carried), "carried {carried}");
        let cost = 10 * choices[0].counts[0] + 5 * choices[0].counts[1];
        assert_eq!(choices[0].total_cost, cost);
    }

    #[test]
    fn prefers_the_cheaper_mix() {
        // Demand 6: two 3-ton trucks at cost 2 beat one 6-ton at cost 9.
        let problem = FleetSizeProblem {
            items: vec![FleetSizeItem {
                list_weights: vec![6, 3],
                costs: vec![9, 2],
            }],
            demand: 6,
        };
        let choices = problem.solve().expect("feasible");
        assert_eq!(choices[0].counts, vec![0, 2]);
        assert_eq!(choices[0].total_cost, 4);
    }

    #[test]
    fn nonpositive_weights_are_rejected() {
        let problem = FleetSizeProblem {
            items: vec![FleetSizeItem {
                list_weights: vec![0],
                costs: vec![1],
            }],
            demand: 5,
        };
        assert!(matches!(
            problem.solve(),
            Err(SolveError::InvalidInput(_))
        ));
    }

    #[test]
    fn mismatched_tables_are_rejected() {
        let problem = FleetSizeProblem {
            items: vec![FleetSizeItem {
                list_weights: vec![5, 3],
                costs: vec![10],
            }],
            demand: 10,
        };
        assert!(matches!(
            problem.solve(),
            Err(SolveError::InvalidInput(_))
        ));
    }
}
