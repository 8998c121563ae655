//! Bin-packing formulations: multi-dimensional knapsack selection and
//! 2-D rectangle packing.
//!
//! The knapsack side loads every capacity dimension into a single engine
//! call; the reported total weight is read along the first dimension, as
//! the wire format expects. The rectangle side is a pure placement
//! heuristic with no failure mode: whatever fits is placed, the rest is
//! reported as unplaced.

use serde::{Deserialize, Serialize};

use crate::engine::{knapsack, packing};
use crate::error::SolveError;

// ----------------------------------------------------------------------
// Multi-dimensional knapsack
// ----------------------------------------------------------------------

/// Item selection instance: `weights` has one row per capacity dimension.
#[derive(Debug, Clone, Deserialize)]
pub struct KnapsackProblem {
    pub profits: Vec<i64>,
    pub weights: Vec<Vec<i64>>,
    pub capacities: Vec<i64>,
}

/// The selected subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnapsackSelection {
    pub packed_items: Vec<usize>,
    pub total_profit: i64,
    /// Summed weight of the selection along the first dimension.
    pub total_weight: i64,
}

impl KnapsackProblem {
    fn validate(&self) -> Result<(), SolveError> {
        if self.weights.is_empty() {
            return Err(SolveError::InvalidInput(
                "at least one weight dimension is required".into(),
            ));
        }
        if self.weights.len() != self.capacities.len() {
            return Err(SolveError::InvalidInput(
                "one capacity per weight dimension is required".into(),
            ));
        }
        if self
            .weights
            .iter()
            .any(|row| row.len() != self.profits.len())
        {
            return Err(SolveError::InvalidInput(
                "every weight row must cover every item".into(),
            ));
        }
        Ok(())
    }

    /// Select the profit-maximal subset fitting every dimension.
    pub fn solve(&self) -> Result<KnapsackSelection, SolveError> {
        self.validate()?;
        let solution = knapsack::solve(&self.profits, &self.weights, &self.capacities);
        let total_weight = solution
            .selected
            .iter()
            .map(|&item| self.weights[0][item])
            .sum();
        tracing::debug!(
            items = solution.selected.len(),
            profit = solution.total_profit,
            "knapsack solved"
        );
        Ok(KnapsackSelection {
            packed_items: solution.selected,
            total_profit: solution.total_profit,
            total_weight,
        })
    }
}

// ----------------------------------------------------------------------
// Rectangle packing
// ----------------------------------------------------------------------

/// A rectangle or bin footprint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RectSize {
    pub width: i64,
    pub height: i64,
}

/// Rectangles-to-bins instance.
#[derive(Debug, Clone, Deserialize)]
pub struct RectPackProblem {
    pub rectangles: Vec<RectSize>,
    pub bins: Vec<RectSize>,
}

/// One placed rectangle on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub bin: usize,
    pub rect: usize,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

/// Packing result. The wire payload carries `placements` only; the
/// `unplaced` list names rectangles that fit no bin.
#[derive(Debug, Clone)]
pub struct RectPacking {
    pub placements: Vec<Placement>,
    pub unplaced: Vec<usize>,
}

impl RectPackProblem {
    /// Place what fits, report what does not.
    pub fn pack(&self) -> RectPacking {
        let rects: Vec<(i64, i64)> = self
            .rectangles
            .iter()
            .map(|r| (r.width, r.height))
            .collect();
        let bins: Vec<(i64, i64)> = self.bins.iter().map(|b| (b.width, b.height)).collect();

        let placed = packing::pack(&rects, &bins);
        let placements: Vec<Placement> = placed
            .iter()
            .map(|p| Placement {
                bin: p.bin,
                rect: p.rect,
                x: p.x,
                y: p.y,
                w: rects[p.rect].0,
                h: rects[p.rect].1,
            })
            .collect();

        let mut unplaced: Vec<usize> = (0..rects.len())
            .filter(|rect| !placed.iter().any(|p| p.rect == *rect))
            .collect();
        unplaced.sort_unstable();
        if !unplaced.is_empty() {
            tracing::debug!(count = unplaced.len(), "rectangles left unplaced");
        }
        RectPacking {
            placements,
            unplaced,
        }
    }
}

// ----------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------

/// The `/bpp` response body.
#[derive(Debug, Clone, Serialize)]
pub struct KnapsackResponse {
    pub packed_items: Vec<usize>,
    pub total_profit: i64,
    pub total_weight: i64,
}

impl From<KnapsackSelection> for KnapsackResponse {
    fn from(selection: KnapsackSelection) -> Self {
        Self {
            packed_items: selection.packed_items,
            total_profit: selection.total_profit,
            total_weight: selection.total_weight,
        }
    }
}

/// The `/bpp2d` response body: placements only, unplaced rectangles are
/// omitted for wire compatibility.
#[derive(Debug, Clone, Serialize)]
pub struct RectPackResponse {
    pub packing: Vec<Placement>,
}

impl From<RectPacking> for RectPackResponse {
    fn from(packing: RectPacking) -> Self {
        Self {
            packing: packing.placements,
        }
    }
}
