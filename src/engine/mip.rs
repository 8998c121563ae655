//! Bounded-integer linear model with branch-and-bound search.
//!
//! Variables are integers with inclusive bounds, constraints are linear
//! ranges over them, and the objective is a linear expression to minimize.
//! The search enumerates variable assignments depth-first, tightening
//! domains by interval propagation up front and pruning branches whose
//! constraint or objective intervals cannot reach a feasible improvement.

/// Handle to a decision variable in a [`MipModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarId(usize);

/// Linear expression: a sum of `coefficient * variable` terms.
#[derive(Debug, Clone, Default)]
pub struct LinExpr {
    terms: Vec<(usize, f64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) -> &mut Self {
        self.terms.push((var.0, coefficient));
        self
    }
}

#[derive(Debug, Clone)]
struct Constraint {
    terms: Vec<(usize, f64)>,
    lo: f64,
    hi: f64,
}

/// Outcome of a solve: tri-state as seen by the formulators.
#[derive(Debug, Clone)]
pub enum MipOutcome {
    Optimal(MipSolution),
    Infeasible,
    /// Search was stopped before proving anything (not produced by the
    /// current exhaustive search, but part of the engine contract).
    Aborted,
}

/// Values and objective of the best assignment found.
#[derive(Debug, Clone)]
pub struct MipSolution {
    values: Vec<i64>,
    pub objective: f64,
}

impl MipSolution {
    /// Read back the solved value of a variable.
    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.0]
    }
}

/// A minimization model over bounded integer variables.
#[derive(Debug, Default)]
pub struct MipModel {
    bounds: Vec<(i64, i64)>,
    constraints: Vec<Constraint>,
    objective: Vec<(usize, f64)>,
}

impl MipModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an integer variable with inclusive bounds.
    pub fn int_var(&mut self, lo: i64, hi: i64) -> VarId {
        self.bounds.push((lo, hi));
        VarId(self.bounds.len() - 1)
    }

    /// Create a 0/1 variable.
    pub fn bool_var(&mut self) -> VarId {
        self.int_var(0, 1)
    }

    /// Constrain `lo <= expr <= hi`.
    pub fn add_range(&mut self, expr: LinExpr, lo: f64, hi: f64) {
        self.constraints.push(Constraint {
            terms: expr.terms,
            lo,
            hi,
        });
    }

    /// Constrain `expr <= hi`.
    pub fn add_le(&mut self, expr: LinExpr, hi: f64) {
        self.add_range(expr, f64::NEG_INFINITY, hi);
    }

    /// Constrain `expr >= lo`.
    pub fn add_ge(&mut self, expr: LinExpr, lo: f64) {
        self.add_range(expr, lo, f64::INFINITY);
    }

    /// Constrain `expr == value`.
    pub fn add_eq(&mut self, expr: LinExpr, value: f64) {
        self.add_range(expr, value, value);
    }

    /// Set the expression to minimize.
    pub fn minimize(&mut self, expr: LinExpr) {
        self.objective = expr.terms;
    }

    /// Solve to completion. Exhaustive over the (propagated) domains, so an
    /// `Optimal` outcome is a true optimum.
    pub fn solve(&self) -> MipOutcome {
        let mut bounds = self.bounds.clone();
        if !propagate(&self.constraints, &mut bounds) {
            return MipOutcome::Infeasible;
        }

        let mut search = Search {
            constraints: &self.constraints,
            objective: &self.objective,
            bounds: &bounds,
            values: vec![0; bounds.len()],
            best: None,
        };
        search.descend(0, 0.0);

        match search.best.take() {
            Some((values, objective)) => {
                tracing::debug!(objective, "mip solve optimal");
                MipOutcome::Optimal(MipSolution { values, objective })
            }
            None => MipOutcome::Infeasible,
        }
    }
}

/// Tighten variable bounds from each constraint until a fixed point.
///
/// Returns false when a domain empties, which proves infeasibility before
/// any search.
fn propagate(constraints: &[Constraint], bounds: &mut [(i64, i64)]) -> bool {
    loop {
        let mut changed = false;
        for constraint in constraints {
            for &(var, coefficient) in &constraint.terms {
                if coefficient == 0.0 {
                    continue;
                }
                // Interval of the other terms.
                let mut rest_lo = 0.0;
                let mut rest_hi = 0.0;
                for &(other, c) in &constraint.terms {
                    if other == var {
                        continue;
                    }
                    let (lo, hi) = bounds[other];
                    let a = c * lo as f64;
                    let b = c * hi as f64;
                    rest_lo += a.min(b);
                    rest_hi += a.max(b);
                }
                // coefficient * var must fit in [lo - rest_hi, hi - rest_lo].
                let term_lo = constraint.lo - rest_hi;
                let term_hi = constraint.hi - rest_lo;
                let (mut var_lo, mut var_hi) = if coefficient > 0.0 {
                    (term_lo / coefficient, term_hi / coefficient)
                } else {
                    (term_hi / coefficient, term_lo / coefficient)
                };
                if var_lo.is_nan() || var_hi.is_nan() {
                    continue;
                }
                var_lo = var_lo.ceil();
                var_hi = var_hi.floor();
                let (lo, hi) = bounds[var];
                let new_lo = if var_lo.is_finite() && var_lo as i64 > lo {
                    var_lo as i64
                } else {
                    lo
                };
                let new_hi = if var_hi.is_finite() && (var_hi as i64) < hi {
                    var_hi as i64
                } else {
                    hi
                };
                if new_lo > new_hi {
                    return false;
                }
                if (new_lo, new_hi) != (lo, hi) {
                    bounds[var] = (new_lo, new_hi);
                    changed = true;
                }
            }
        }
        if !changed {
            return true;
        }
    }
}

struct Search<'a> {
    constraints: &'a [Constraint],
    objective: &'a [(usize, f64)],
    bounds: &'a [(i64, i64)],
    values: Vec<i64>,
    best: Option<(Vec<i64>, f64)>,
}

impl Search<'_> {
    fn descend(&mut self, depth: usize, cost_so_far: f64) {
        // Objective bound: assigned cost plus the cheapest completion.
        let mut lower = cost_so_far;
        for &(var, c) in self.objective {
            if var >= depth {
                let (lo, hi) = self.bounds[var];
                lower += (c * lo as f64).min(c * hi as f64);
            }
        }
        if let Some((_, best)) = &self.best {
            if lower >= *best {
                return;
            }
        }

        if depth == self.bounds.len() {
            if self.feasible(depth) {
                self.best = Some((self.values.clone(), cost_so_far));
            }
            return;
        }

        if !self.feasible(depth) {
            return;
        }

        let (lo, hi) = self.bounds[depth];
        for value in lo..=hi {
            self.values[depth] = value;
            let contribution: f64 = self
                .objective
                .iter()
                .filter(|term| term.0 == depth)
                .map(|term| term.1 * value as f64)
                .sum();
            self.descend(depth + 1, cost_so_far + contribution);
        }
        self.values[depth] = lo;
    }

    /// Check every constraint against the first `assigned` values, using
    /// bound intervals for the rest.
    fn feasible(&self, assigned: usize) -> bool {
        for constraint in self.constraints {
            let mut lo_sum = 0.0;
            let mut hi_sum = 0.0;
            for &(var, c) in &constraint.terms {
                if var < assigned {
                    let v = c * self.values[var] as f64;
                    lo_sum += v;
                    hi_sum += v;
                } else {
                    let (lo, hi) = self.bounds[var];
                    let a = c * lo as f64;
                    let b = c * hi as f64;
                    lo_sum += a.min(b);
                    hi_sum += a.max(b);
                }
            }
            if hi_sum < constraint.lo || lo_sum > constraint.hi {
                return false;
            }
        }
        true
    }
}
