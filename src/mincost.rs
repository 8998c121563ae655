//! Min-cost flow formulation.
//!
//! Arcs arrive as parallel tail/head/cost arrays, each with capacity one;
//! node supplies must net to zero. The result lists only the arcs that
//! carry flow.

use serde::{Deserialize, Serialize};

use crate::engine::flow::{FlowOutcome, MinCostFlow};
use crate::error::SolveError;

/// A flow instance over unit-capacity arcs.
#[derive(Debug, Clone)]
pub struct MinCostFlowProblem {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
    pub costs: Vec<i64>,
    pub supplies: Vec<i64>,
}

/// An arc carrying positive flow in the optimal solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowArc {
    pub arc: usize,
    pub tail: usize,
    pub head: usize,
    pub cost: i64,
}

/// Total cost plus the flow-carrying arcs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinCostFlowSolution {
    pub total: i64,
    pub arcs: Vec<FlowArc>,
}

impl MinCostFlowProblem {
    fn validate(&self) -> Result<(), SolveError> {
        if self.starts.len() != self.ends.len() || self.starts.len() != self.costs.len() {
            return Err(SolveError::InvalidInput(
                "starts, ends and costs must have the same length".into(),
            ));
        }
        let num_nodes = self.supplies.len();
        if self
            .starts
            .iter()
            .chain(self.ends.iter())
            .any(|&node| node >= num_nodes)
        {
            return Err(SolveError::InvalidInput(
                "arc endpoint outside the supply array".into(),
            ));
        }
        Ok(())
    }

    /// Solve to optimality; a non-optimal outcome rejects the request.
    pub fn solve(&self) -> Result<MinCostFlowSolution, SolveError> {
        self.validate()?;

        let mut network = MinCostFlow::new();
        for ((&tail, &head), &cost) in self.starts.iter().zip(&self.ends).zip(&self.costs) {
            network.add_arc(tail, head, cost);
        }
        for (node, &supply) in self.supplies.iter().enumerate() {
            network.set_supply(node, supply);
        }

        match network.solve() {
            FlowOutcome::Optimal { total_cost, flows } => {
                tracing::debug!(total_cost, "min-cost flow solved");
                let arcs = flows
                    .iter()
                    .enumerate()
                    .filter(|&(_, &flow)| flow > 0)
                    .map(|(arc, _)| FlowArc {
                        arc,
                        tail: self.starts[arc],
                        head: self.ends[arc],
                        cost: self.costs[arc],
                    })
                    .collect();
                Ok(MinCostFlowSolution {
                    total: total_cost,
                    arcs,
                })
            }
            FlowOutcome::Infeasible => Err(SolveError::Infeasible),
        }
    }
}

// ----------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------

/// The `/min_cost` request body. `source` and `sink` ride along on the
/// wire but the supplies array already determines both.
#[derive(Debug, Clone, Deserialize)]
pub struct MinCostFlowRequest {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
    pub costs: Vec<i64>,
    pub supplies: Vec<i64>,
    pub source: usize,
    pub sink: usize,
}

impl From<MinCostFlowRequest> for MinCostFlowProblem {
    fn from(request: MinCostFlowRequest) -> Self {
        Self {
            starts: request.starts,
            ends: request.ends,
            costs: request.costs,
            supplies: request.supplies,
        }
    }
}
