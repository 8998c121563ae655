//! Multi-dimensional 0/1 knapsack, branch and bound.
//!
//! All capacity dimensions are enforced simultaneously in a single solve.
//! The search branches on include/exclude per item and prunes with the
//! remaining-profit bound, so the returned selection is optimal.

/// An optimal item selection.
#[derive(Debug, Clone, Default)]
pub struct KnapsackSolution {
    pub total_profit: i64,
    pub selected: Vec<usize>,
}

/// Maximize total profit subject to every dimension's capacity.
///
/// `weights` has one row per dimension, each row one entry per item;
/// `capacities` has one entry per dimension. Callers validate that shape.
pub fn solve(profits: &[i64], weights: &[Vec<i64>], capacities: &[i64]) -> KnapsackSolution {
    let num_items = profits.len();

    // Profit still reachable from each suffix, for bounding.
    let mut suffix_profit = vec![0_i64; num_items + 1];
    for item in (0..num_items).rev() {
        suffix_profit[item] = suffix_profit[item + 1] + profits[item].max(0);
    }

    let mut search = Search {
        profits,
        weights,
        capacities,
        suffix_profit,
        used: vec![0; capacities.len()],
        chosen: Vec::new(),
        best_profit: 0,
        best_selection: Vec::new(),
    };
    search.descend(0, 0);

    KnapsackSolution {
        total_profit: search.best_profit,
        selected: search.best_selection,
    }
}

struct Search<'a> {
    profits: &'a [i64],
    weights: &'a [Vec<i64>],
    capacities: &'a [i64],
    suffix_profit: Vec<i64>,
    used: Vec<i64>,
    chosen: Vec<usize>,
    best_profit: i64,
    best_selection: Vec<usize>,
}

impl Search<'_> {
    fn descend(&mut self, item: usize, profit: i64) {
        if profit + self.suffix_profit[item] <= self.best_profit {
            return;
        }
        if item == self.profits.len() {
            self.best_profit = profit;
            self.best_selection = self.chosen.clone();
            return;
        }

        // Include, when every dimension still has room.
        let fits = (0..self.capacities.len())
            .all(|dimension| self.used[dimension] + self.weights[dimension][item] <= self.capacities[dimension]);
        if fits {
            for dimension in 0..self.capacities.len() {
                self.used[dimension] += self.weights[dimension][item];
            }
            self.chosen.push(item);
            self.descend(item + 1, profit + self.profits[item]);
            self.chosen.pop();
            for dimension in 0..self.capacities.len() {
                self.used[dimension] -= self.weights[dimension][item];
            }
        }

        // Exclude.
        self.descend(item + 1, profit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_best_single_dimension_subset() {
        let solution = solve(&[10, 20, 30], &[vec![1, 1, 1]], &[2]);
        assert_eq!(solution.total_profit, 50);
        assert_eq!(solution.selected, vec![1, 2]);
    }

    #[test]
    fn respects_every_dimension() {
        // Item 2 is profitable but blows the second dimension.
        let solution = solve(
            &[10, 20, 100],
            &[vec![1, 1, 1], vec![1, 1, 50]],
            &[3, 10],
        );
        assert_eq!(solution.selected, vec![0, 1]);
        assert_eq!(solution.total_profit, 30);
    }

    #[test]
    fn empty_input_selects_nothing() {
        let solution = solve(&[], &[vec![]], &[5]);
        assert!(solution.selected.is_empty());
        assert_eq!(solution.total_profit, 0);
    }
}
