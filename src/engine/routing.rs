//! Routing model with cumulative dimensions.
//!
//! A model spans N nodes and V vehicles, each vehicle with its own start and
//! end depot node. Arc costs and per-dimension transits are supplied as
//! evaluator trait objects borrowed from the caller. Cumulative dimensions
//! track a quantity (load, time, distance) along each route with per-arc
//! transit, bounded slack (waiting), and per-vehicle capacity; individual
//! cumul variables can be range-constrained, pinned, or have intervals
//! carved out of their domain.
//!
//! The search is exhaustive for small instances and otherwise runs a
//! cheapest-insertion construction followed by a 2-opt/relocate improvement
//! loop under an optional wall-clock budget. Arc costs are assumed
//! non-negative; the branch-and-bound pruning relies on it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-arc evaluator for costs and dimension transits.
///
/// Implementations bundle whatever request data they need (locations,
/// service times, vehicle speed) and stay borrowed by the model for its
/// lifetime.
pub trait TransitEvaluator {
    fn transit(&self, from: usize, to: usize) -> i64;
}

/// Position of a cumul variable along a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteIndex {
    /// A visited node, addressed by node id.
    Node(usize),
    /// The start of a vehicle's route.
    Start(usize),
    /// The end of a vehicle's route.
    End(usize),
}

/// Handle to a registered dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionId(usize);

/// Transit evaluators for a dimension: one shared, or one per vehicle.
pub enum Transits<'a> {
    Shared(&'a dyn TransitEvaluator),
    PerVehicle(Vec<&'a dyn TransitEvaluator>),
}

/// Cumul upper bounds for a dimension.
pub enum Capacities {
    Uniform(i64),
    PerVehicle(Vec<i64>),
}

/// Declaration of a cumulative dimension.
pub struct DimensionSpec<'a> {
    pub transits: Transits<'a>,
    /// Maximum slack (waiting) insertable on each arc.
    pub slack_max: i64,
    pub capacities: Capacities,
    /// Pin the cumul at every route start to zero.
    pub start_cumul_to_zero: bool,
}

struct Dimension<'a> {
    name: &'static str,
    spec: DimensionSpec<'a>,
    ranges: HashMap<RouteIndex, (i64, i64)>,
    removed: HashMap<RouteIndex, Vec<(i64, i64)>>,
}

impl<'a> Dimension<'a> {
    fn transit(&self, vehicle: usize, from: usize, to: usize) -> i64 {
        match &self.spec.transits {
            Transits::Shared(evaluator) => evaluator.transit(from, to),
            Transits::PerVehicle(evaluators) => evaluators[vehicle].transit(from, to),
        }
    }

    fn capacity(&self, vehicle: usize) -> i64 {
        match &self.spec.capacities {
            Capacities::Uniform(capacity) => *capacity,
            Capacities::PerVehicle(capacities) => capacities[vehicle],
        }
    }

    /// Effective [lo, hi] domain bounds at an index.
    fn range(&self, index: RouteIndex, vehicle: usize) -> (i64, i64) {
        let mut lo = 0;
        let mut hi = self.capacity(vehicle);
        if matches!(index, RouteIndex::Start(_)) && self.spec.start_cumul_to_zero {
            hi = 0;
        }
        if let Some(&(range_lo, range_hi)) = self.ranges.get(&index) {
            lo = lo.max(range_lo);
            hi = hi.min(range_hi);
        }
        (lo, hi)
    }
}

/// Search configuration. The default solves to completion with the
/// automatic construction strategy and the improvement loop enabled.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Wall-clock budget. `None` runs until the search is exhausted.
    pub time_limit: Option<Duration>,
}

/// Solved cumul variable: chosen value plus its feasible [min, max].
#[derive(Debug, Clone)]
pub struct CumulReading {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

/// One stop on a solved route, with a cumul reading per dimension.
#[derive(Debug, Clone)]
pub struct SolvedStop {
    pub node: usize,
    cumuls: Vec<CumulReading>,
}

impl SolvedStop {
    pub fn cumul(&self, dimension: DimensionId) -> &CumulReading {
        &self.cumuls[dimension.0]
    }
}

/// A feasible (locally optimal) routing solution.
#[derive(Debug, Clone)]
pub struct RoutingSolution {
    pub objective: i64,
    routes: Vec<Vec<SolvedStop>>,
}

impl RoutingSolution {
    pub fn num_vehicles(&self) -> usize {
        self.routes.len()
    }

    /// The full route of a vehicle, start and end depots included.
    pub fn vehicle_route(&self, vehicle: usize) -> &[SolvedStop] {
        &self.routes[vehicle]
    }
}

/// Instances at or below this many free nodes are solved exhaustively.
const EXACT_SEARCH_LIMIT: usize = 8;

/// Penalty applied per route violating an end-domain carve-out while the
/// improvement loop drives violations out.
const END_VIOLATION_PENALTY: i64 = 1_000_000;

/// A routing model under construction.
pub struct RoutingModel<'a> {
    num_nodes: usize,
    starts: Vec<usize>,
    ends: Vec<usize>,
    arc_cost: Option<&'a dyn TransitEvaluator>,
    fixed_costs: Vec<i64>,
    dimensions: Vec<Dimension<'a>>,
    forbidden: Vec<Vec<bool>>,
    soft_groups: Vec<(Vec<usize>, i64)>,
}

impl<'a> RoutingModel<'a> {
    /// Create a model over `num_nodes` nodes with one start/end depot node
    /// per vehicle.
    pub fn new(num_nodes: usize, starts: Vec<usize>, ends: Vec<usize>) -> Self {
        assert_eq!(starts.len(), ends.len(), "one start and end per vehicle");
        let num_vehicles = starts.len();
        Self {
            num_nodes,
            starts,
            ends,
            arc_cost: None,
            fixed_costs: vec![0; num_vehicles],
            dimensions: Vec::new(),
            forbidden: vec![vec![false; num_nodes]; num_nodes],
            soft_groups: Vec::new(),
        }
    }

    pub fn num_vehicles(&self) -> usize {
        self.starts.len()
    }

    /// Arc cost evaluator shared by all vehicles.
    pub fn set_arc_cost(&mut self, evaluator: &'a dyn TransitEvaluator) {
        self.arc_cost = Some(evaluator);
    }

    /// Fixed cost charged when the vehicle serves at least one node.
    pub fn set_fixed_vehicle_cost(&mut self, vehicle: usize, cost: i64) {
        self.fixed_costs[vehicle] = cost;
    }

    /// Register a cumulative dimension.
    pub fn add_dimension(&mut self, name: &'static str, spec: DimensionSpec<'a>) -> DimensionId {
        self.dimensions.push(Dimension {
            name,
            spec,
            ranges: HashMap::new(),
            removed: HashMap::new(),
        });
        DimensionId(self.dimensions.len() - 1)
    }

    /// Intersect the cumul domain at `index` with [lo, hi].
    pub fn set_cumul_range(&mut self, dimension: DimensionId, index: RouteIndex, lo: i64, hi: i64) {
        let entry = self.dimensions[dimension.0]
            .ranges
            .entry(index)
            .or_insert((i64::MIN, i64::MAX));
        entry.0 = entry.0.max(lo);
        entry.1 = entry.1.min(hi);
    }

    /// Pin the cumul at `index` to a single value.
    pub fn pin_cumul(&mut self, dimension: DimensionId, index: RouteIndex, value: i64) {
        self.set_cumul_range(dimension, index, value, value);
    }

    /// Remove the closed interval [lo, hi] from the cumul domain at `index`.
    /// An empty interval (lo > hi) is a no-op.
    pub fn remove_cumul_interval(
        &mut self,
        dimension: DimensionId,
        index: RouteIndex,
        lo: i64,
        hi: i64,
    ) {
        if lo > hi {
            return;
        }
        self.dimensions[dimension.0]
            .removed
            .entry(index)
            .or_default()
            .push((lo, hi));
    }

    /// Remove `to` from the next-node domain of `from`: no route may
    /// travel directly between the two visited nodes.
    pub fn forbid_arc(&mut self, from: usize, to: usize) {
        self.forbidden[from][to] = true;
    }

    /// Soft preference that all `nodes` are served by one vehicle; each
    /// node served elsewhere costs `penalty`.
    pub fn add_soft_same_vehicle(&mut self, nodes: Vec<usize>, penalty: i64) {
        if !nodes.is_empty() {
            self.soft_groups.push((nodes, penalty));
        }
    }

    /// Solve the model. `None` means no feasible solution was found within
    /// the search budget.
    pub fn solve(&self, params: &SearchParams) -> Option<RoutingSolution> {
        let arc_cost = self.arc_cost?;
        let deadline = params.time_limit.map(|limit| Instant::now() + limit);

        let mut is_depot = vec![false; self.num_nodes];
        for &node in self.starts.iter().chain(self.ends.iter()) {
            is_depot[node] = true;
        }
        let free: Vec<usize> = (0..self.num_nodes).filter(|&n| !is_depot[n]).collect();

        let search = SearchState {
            model: self,
            arc_cost,
            deadline,
        };

        let routes = if free.len() <= EXACT_SEARCH_LIMIT {
            search.exact(&free)?
        } else {
            search.heuristic(&free)?
        };

        self.build_solution(&routes, arc_cost)
    }

    // ------------------------------------------------------------------
    // Feasibility and cost
    // ------------------------------------------------------------------

    fn full_route(&self, vehicle: usize, interior: &[usize]) -> Vec<usize> {
        let mut nodes = Vec::with_capacity(interior.len() + 2);
        nodes.push(self.starts[vehicle]);
        nodes.extend_from_slice(interior);
        nodes.push(self.ends[vehicle]);
        nodes
    }

    /// Forward/backward cumul propagation for one dimension on a full
    /// route. Returns per-position (earliest, latest) or `None` when the
    /// route violates the dimension.
    fn dimension_profile(
        &self,
        dimension: &Dimension<'a>,
        vehicle: usize,
        nodes: &[usize],
        enforce_end_removals: bool,
    ) -> Option<Vec<(i64, i64)>> {
        let len = nodes.len();
        let slack_max = dimension.spec.slack_max;

        let index_of = |position: usize| -> RouteIndex {
            if position == 0 {
                RouteIndex::Start(vehicle)
            } else if position + 1 == len {
                RouteIndex::End(vehicle)
            } else {
                RouteIndex::Node(nodes[position])
            }
        };
        let removals_apply = |index: RouteIndex| -> bool {
            enforce_end_removals || !matches!(index, RouteIndex::End(_))
        };

        // Forward pass: earliest feasible cumul at each position.
        let mut earliest = vec![0_i64; len];
        for position in 0..len {
            let index = index_of(position);
            let (lo, hi) = dimension.range(index, vehicle);
            let base = if position == 0 {
                lo
            } else {
                let transit = dimension.transit(vehicle, nodes[position - 1], nodes[position]);
                earliest[position - 1] + transit
            };
            let mut value = base.max(lo);
            if removals_apply(index) {
                if let Some(removed) = dimension.removed.get(&index) {
                    value = bump_up(value, removed);
                }
            }
            if value > hi || (position > 0 && value - base > slack_max) {
                return None;
            }
            earliest[position] = value;
        }

        // With no slack the route determines every cumul exactly.
        if slack_max == 0 {
            return Some(earliest.into_iter().map(|value| (value, value)).collect());
        }

        // Backward pass: latest feasible cumul at each position.
        let mut latest = vec![0_i64; len];
        for position in (0..len).rev() {
            let index = index_of(position);
            let (_, hi) = dimension.range(index, vehicle);
            let mut value = if position + 1 == len {
                hi
            } else {
                let transit = dimension.transit(vehicle, nodes[position], nodes[position + 1]);
                hi.min(latest[position + 1].saturating_sub(transit))
            };
            if removals_apply(index) {
                if let Some(removed) = dimension.removed.get(&index) {
                    value = bump_down(value, removed);
                }
            }
            if value < earliest[position] {
                return None;
            }
            latest[position] = value;
        }

        Some(earliest.into_iter().zip(latest).collect())
    }

    /// Feasibility of a complete route across every dimension plus the
    /// forbidden-arc domains.
    fn route_feasible(&self, vehicle: usize, interior: &[usize], enforce_end_removals: bool) -> bool {
        for window in interior.windows(2) {
            if self.forbidden[window[0]][window[1]] {
                return false;
            }
        }
        let nodes = self.full_route(vehicle, interior);
        self.dimensions
            .iter()
            .all(|dimension| {
                self.dimension_profile(dimension, vehicle, &nodes, enforce_end_removals)
                    .is_some()
            })
    }

    /// Forward-only feasibility of a partial route (no end depot yet).
    fn partial_feasible(&self, vehicle: usize, interior: &[usize]) -> bool {
        for window in interior.windows(2) {
            if self.forbidden[window[0]][window[1]] {
                return false;
            }
        }
        let mut nodes = Vec::with_capacity(interior.len() + 1);
        nodes.push(self.starts[vehicle]);
        nodes.extend_from_slice(interior);

        for dimension in &self.dimensions {
            let slack_max = dimension.spec.slack_max;
            let mut cumul = 0_i64;
            for position in 0..nodes.len() {
                let index = if position == 0 {
                    RouteIndex::Start(vehicle)
                } else {
                    RouteIndex::Node(nodes[position])
                };
                let (lo, hi) = dimension.range(index, vehicle);
                let base = if position == 0 {
                    lo
                } else {
                    cumul + dimension.transit(vehicle, nodes[position - 1], nodes[position])
                };
                let mut value = base.max(lo);
                if let Some(removed) = dimension.removed.get(&index) {
                    value = bump_up(value, removed);
                }
                if value > hi || (position > 0 && value - base > slack_max) {
                    return false;
                }
                cumul = value;
            }
        }
        true
    }

    fn route_arc_cost(&self, arc_cost: &dyn TransitEvaluator, vehicle: usize, interior: &[usize]) -> i64 {
        let nodes = self.full_route(vehicle, interior);
        let mut total: i64 = nodes
            .windows(2)
            .map(|pair| arc_cost.transit(pair[0], pair[1]))
            .sum();
        if !interior.is_empty() {
            total += self.fixed_costs[vehicle];
        }
        total
    }

    fn soft_group_penalty(&self, routes: &[Vec<usize>]) -> i64 {
        if self.soft_groups.is_empty() {
            return 0;
        }
        let mut serving_vehicle: HashMap<usize, usize> = HashMap::new();
        for (vehicle, interior) in routes.iter().enumerate() {
            for &node in interior {
                serving_vehicle.insert(node, vehicle);
            }
        }
        let mut penalty = 0;
        for (nodes, per_node) in &self.soft_groups {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            let mut served = 0;
            for node in nodes {
                if let Some(&vehicle) = serving_vehicle.get(node) {
                    *counts.entry(vehicle).or_default() += 1;
                    served += 1;
                }
            }
            let majority = counts.values().copied().max().unwrap_or(0);
            penalty += per_node * (served - majority) as i64;
        }
        penalty
    }

    /// Full objective of a set of routes, with end-domain violations
    /// penalized instead of rejected.
    fn penalized_cost(&self, arc_cost: &dyn TransitEvaluator, routes: &[Vec<usize>]) -> Option<i64> {
        let mut total = 0;
        for (vehicle, interior) in routes.iter().enumerate() {
            if !self.route_feasible(vehicle, interior, false) {
                return None;
            }
            if !self.route_feasible(vehicle, interior, true) {
                total += END_VIOLATION_PENALTY;
            }
            total += self.route_arc_cost(arc_cost, vehicle, interior);
        }
        Some(total + self.soft_group_penalty(routes))
    }

    fn build_solution(
        &self,
        routes: &[Vec<usize>],
        arc_cost: &dyn TransitEvaluator,
    ) -> Option<RoutingSolution> {
        let mut solved_routes = Vec::with_capacity(routes.len());
        let mut objective = self.soft_group_penalty(routes);

        for (vehicle, interior) in routes.iter().enumerate() {
            let nodes = self.full_route(vehicle, interior);
            let mut profiles = Vec::with_capacity(self.dimensions.len());
            for dimension in &self.dimensions {
                let profile = self.dimension_profile(dimension, vehicle, &nodes, true)?;
                tracing::trace!(dimension = dimension.name, vehicle, "dimension solved");
                profiles.push(profile);
            }
            let stops = nodes
                .iter()
                .enumerate()
                .map(|(position, &node)| SolvedStop {
                    node,
                    cumuls: profiles
                        .iter()
                        .map(|profile| {
                            let (min, max) = profile[position];
                            CumulReading { value: min, min, max }
                        })
                        .collect(),
                })
                .collect();
            solved_routes.push(stops);
            objective += self.route_arc_cost(arc_cost, vehicle, interior);
        }

        Some(RoutingSolution {
            objective,
            routes: solved_routes,
        })
    }
}

// ----------------------------------------------------------------------
// Search
// ----------------------------------------------------------------------

struct SearchState<'m, 'a> {
    model: &'m RoutingModel<'a>,
    arc_cost: &'a dyn TransitEvaluator,
    deadline: Option<Instant>,
}

impl SearchState<'_, '_> {
    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Exhaustive search over ordered node partitions: nodes are appended
    /// to the current vehicle or the vehicle is closed, which enumerates
    /// every assignment exactly once.
    fn exact(&self, free: &[usize]) -> Option<Vec<Vec<usize>>> {
        let mut routes = vec![Vec::new(); self.model.num_vehicles()];
        let mut remaining: Vec<usize> = free.to_vec();
        let mut best: Option<(i64, Vec<Vec<usize>>)> = None;
        self.exact_descend(&mut routes, &mut remaining, 0, &mut best);
        best.map(|(_, routes)| routes)
    }

    fn exact_descend(
        &self,
        routes: &mut Vec<Vec<usize>>,
        remaining: &mut Vec<usize>,
        vehicle: usize,
        best: &mut Option<(i64, Vec<Vec<usize>>)>,
    ) {
        if self.out_of_time() {
            return;
        }
        if let Some((best_cost, _)) = best {
            // Arc costs are non-negative, so the cost of the open routes
            // already bounds the completion from below.
            if self.partial_cost(routes) >= *best_cost {
                return;
            }
        }
        if remaining.is_empty() {
            if let Some(cost) = self.complete_cost(routes) {
                if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                    *best = Some((cost, routes.clone()));
                }
            }
            return;
        }
        if vehicle >= self.model.num_vehicles() {
            return;
        }

        // Extend the current vehicle with each remaining node.
        for slot in 0..remaining.len() {
            let node = remaining.swap_remove(slot);
            routes[vehicle].push(node);
            if self.model.partial_feasible(vehicle, &routes[vehicle]) {
                self.exact_descend(routes, remaining, vehicle, best);
            }
            routes[vehicle].pop();
            // swap_remove moved the tail into `slot`; undo it.
            remaining.push(node);
            let last = remaining.len() - 1;
            remaining.swap(slot, last);
        }

        // Or close this vehicle and move on.
        self.exact_descend(routes, remaining, vehicle + 1, best);
    }

    /// Arc cost of the open (unclosed) routes so far.
    fn partial_cost(&self, routes: &[Vec<usize>]) -> i64 {
        let mut total = 0;
        for (vehicle, interior) in routes.iter().enumerate() {
            if interior.is_empty() {
                continue;
            }
            total += self.arc_cost.transit(self.model.starts[vehicle], interior[0]);
            total += interior
                .windows(2)
                .map(|pair| self.arc_cost.transit(pair[0], pair[1]))
                .sum::<i64>();
            total += self.model.fixed_costs[vehicle];
        }
        total
    }

    /// Objective of a complete assignment, `None` when any route is
    /// infeasible (end constraints included).
    fn complete_cost(&self, routes: &[Vec<usize>]) -> Option<i64> {
        let mut total = 0;
        for (vehicle, interior) in routes.iter().enumerate() {
            if !self.model.route_feasible(vehicle, interior, true) {
                return None;
            }
            total += self.model.route_arc_cost(self.arc_cost, vehicle, interior);
        }
        Some(total + self.model.soft_group_penalty(routes))
    }

    /// Cheapest-insertion construction followed by the improvement loop.
    fn heuristic(&self, free: &[usize]) -> Option<Vec<Vec<usize>>> {
        let mut routes = vec![Vec::new(); self.model.num_vehicles()];
        let mut unassigned: Vec<usize> = free.to_vec();

        while !unassigned.is_empty() {
            let mut best_insertion: Option<(i64, usize, usize, usize)> = None;
            for (slot, &node) in unassigned.iter().enumerate() {
                for vehicle in 0..routes.len() {
                    let current = self.model.route_arc_cost(self.arc_cost, vehicle, &routes[vehicle]);
                    for position in 0..=routes[vehicle].len() {
                        let mut candidate = routes[vehicle].clone();
                        candidate.insert(position, node);
                        if !self.model.route_feasible(vehicle, &candidate, false) {
                            continue;
                        }
                        let delta =
                            self.model.route_arc_cost(self.arc_cost, vehicle, &candidate) - current;
                        if best_insertion
                            .as_ref()
                            .is_none_or(|(best_delta, ..)| delta < *best_delta)
                        {
                            best_insertion = Some((delta, slot, vehicle, position));
                        }
                    }
                }
            }
            let (_, slot, vehicle, position) = best_insertion?;
            let node = unassigned.swap_remove(slot);
            routes[vehicle].insert(position, node);
        }

        self.improve(&mut routes);

        // The construction relaxes end-domain carve-outs; the improvement
        // loop must have driven any violation out for the result to stand.
        for (vehicle, interior) in routes.iter().enumerate() {
            if !self.model.route_feasible(vehicle, interior, true) {
                tracing::debug!(vehicle, "route violates end-domain constraints");
                return None;
            }
        }
        Some(routes)
    }

    /// Guided improvement: 2-opt within routes and relocate across routes,
    /// repeated until no move helps or the budget runs out.
    fn improve(&self, routes: &mut Vec<Vec<usize>>) {
        let mut current = match self.model.penalized_cost(self.arc_cost, routes) {
            Some(cost) => cost,
            None => return,
        };
        loop {
            if self.out_of_time() {
                return;
            }
            let mut improved = false;

            // 2-opt: reverse a segment within one route.
            for vehicle in 0..routes.len() {
                let len = routes[vehicle].len();
                if len < 2 {
                    continue;
                }
                'segments: for i in 0..len - 1 {
                    for j in i + 1..len {
                        let mut candidate = routes.clone();
                        candidate[vehicle][i..=j].reverse();
                        if let Some(cost) = self.model.penalized_cost(self.arc_cost, &candidate) {
                            if cost < current {
                                *routes = candidate;
                                current = cost;
                                improved = true;
                                break 'segments;
                            }
                        }
                    }
                }
            }

            // Relocate: move one node to any position of any route.
            'relocate: for from in 0..routes.len() {
                for slot in 0..routes[from].len() {
                    for to in 0..routes.len() {
                        let positions = if from == to {
                            routes[to].len()
                        } else {
                            routes[to].len() + 1
                        };
                        for position in 0..positions {
                            if from == to && (position == slot || position == slot + 1) {
                                continue;
                            }
                            let mut candidate = routes.clone();
                            let node = candidate[from].remove(slot);
                            let adjusted = if from == to && position > slot {
                                position - 1
                            } else {
                                position
                            };
                            candidate[to].insert(adjusted, node);
                            if let Some(cost) = self.model.penalized_cost(self.arc_cost, &candidate)
                            {
                                if cost < current {
                                    *routes = candidate;
                                    current = cost;
                                    improved = true;
                                    break 'relocate;
                                }
                            }
                        }
                    }
                }
            }

            if !improved {
                return;
            }
        }
    }
}

/// Smallest value >= `value` outside every removed interval.
fn bump_up(mut value: i64, removed: &[(i64, i64)]) -> i64 {
    let mut moved = true;
    while moved {
        moved = false;
        for &(lo, hi) in removed {
            if value >= lo && value <= hi {
                value = hi + 1;
                moved = true;
            }
        }
    }
    value
}

/// Largest value <= `value` outside every removed interval.
fn bump_down(mut value: i64, removed: &[(i64, i64)]) -> i64 {
    let mut moved = true;
    while moved {
        moved = false;
        for &(lo, hi) in removed {
            if value >= lo && value <= hi {
                value = lo - 1;
                moved = true;
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MatrixCost(Vec<Vec<i64>>);

    impl TransitEvaluator for MatrixCost {
        fn transit(&self, from: usize, to: usize) -> i64 {
            self.0[from][to]
        }
    }

    struct UnitDemand;

    impl TransitEvaluator for UnitDemand {
        fn transit(&self, _from: usize, _to: usize) -> i64 {
            1
        }
    }

    struct NodeWeights(Vec<i64>);

    impl TransitEvaluator for NodeWeights {
        fn transit(&self, from: usize, _to: usize) -> i64 {
            self.0[from]
        }
    }

    fn square(costs: &[&[i64]]) -> MatrixCost {
        MatrixCost(costs.iter().map(|row| row.to_vec()).collect())
    }

    #[test]
    fn single_vehicle_picks_cheapest_order() {
        // 0 -> {1, 2} -> 3, cheapest is 0-2-1-3 (1+1+1) over 0-1-2-3 (5+1+5).
        let costs = square(&[
            &[0, 5, 1, 9],
            &[5, 0, 1, 1],
            &[1, 1, 0, 5],
            &[9, 1, 5, 0],
        ]);
        let mut model = RoutingModel::new(4, vec![0], vec![3]);
        model.set_arc_cost(&costs);
        let solution = model.solve(&SearchParams::default()).expect("feasible");

        let nodes: Vec<usize> = solution.vehicle_route(0).iter().map(|s| s.node).collect();
        assert_eq!(nodes, vec![0, 2, 1, 3]);
        assert_eq!(solution.objective, 3);
    }

    #[test]
    fn forbidden_arc_reroutes() {
        let costs = square(&[
            &[0, 1, 2, 3],
            &[1, 0, 1, 1],
            &[2, 1, 0, 1],
            &[3, 1, 1, 0],
        ]);
        let mut model = RoutingModel::new(4, vec![0], vec![3]);
        model.set_arc_cost(&costs);
        // The otherwise-optimal 1 -> 2 transition is not allowed.
        model.forbid_arc(1, 2);
        let solution = model.solve(&SearchParams::default()).expect("feasible");

        let nodes: Vec<usize> = solution.vehicle_route(0).iter().map(|s| s.node).collect();
        for pair in nodes.windows(2) {
            assert!(!(pair[0] == 1 && pair[1] == 2));
        }
    }

    #[test]
    fn capacity_dimension_limits_load() {
        // Three unit-demand nodes, one vehicle of capacity 2: infeasible.
        let costs = square(&[
            &[0, 1, 1, 1, 1],
            &[1, 0, 1, 1, 1],
            &[1, 1, 0, 1, 1],
            &[1, 1, 1, 0, 1],
            &[1, 1, 1, 1, 0],
        ]);
        let demand = UnitDemand;
        let mut model = RoutingModel::new(5, vec![0], vec![4]);
        model.set_arc_cost(&costs);
        model.add_dimension(
            "capacity",
            DimensionSpec {
                transits: Transits::Shared(&demand),
                slack_max: 0,
                capacities: Capacities::PerVehicle(vec![2]),
                start_cumul_to_zero: true,
            },
        );
        assert!(model.solve(&SearchParams::default()).is_none());
    }

    #[test]
    fn end_interval_removal_forces_minimum_load() {
        // Two vehicles, two unit-weight nodes, and [1, 1] carved out of
        // both end loads: a vehicle may finish empty (0) or with both
        // nodes (2), never with one.
        let costs = square(&[
            &[0, 1, 1, 0],
            &[1, 0, 1, 1],
            &[1, 1, 0, 1],
            &[0, 1, 1, 0],
        ]);
        let weights = NodeWeights(vec![0, 1, 1, 0]);
        let mut model = RoutingModel::new(4, vec![0, 0], vec![3, 3]);
        model.set_arc_cost(&costs);
        let capacity = model.add_dimension(
            "capacity",
            DimensionSpec {
                transits: Transits::Shared(&weights),
                slack_max: 0,
                capacities: Capacities::PerVehicle(vec![10, 10]),
                start_cumul_to_zero: true,
            },
        );
        model.remove_cumul_interval(capacity, RouteIndex::End(0), 1, 1);
        model.remove_cumul_interval(capacity, RouteIndex::End(1), 1, 1);
        let solution = model.solve(&SearchParams::default()).expect("feasible");

        let mut sizes = Vec::new();
        for vehicle in 0..2 {
            let stops = solution.vehicle_route(vehicle);
            let end_load = stops.last().expect("route").cumul(capacity).value;
            assert_ne!(end_load, 1, "vehicle {vehicle} ended inside the carve-out");
            sizes.push(stops.len() - 2);
        }
        sizes.sort_unstable();
        assert_eq!(sizes, vec![0, 2], "nodes were split across vehicles");
    }

    #[test]
    fn soft_same_vehicle_penalty_tips_grouping() {
        // Splitting nodes 1 and 2 across the two vehicles is cheaper on
        // distance alone (8 vs 14), but the 40-per-node penalty makes the
        // grouped route win.
        let costs = square(&[
            &[0, 2, 2, 0],
            &[2, 0, 10, 2],
            &[2, 10, 0, 2],
            &[0, 2, 2, 0],
        ]);
        let mut model = RoutingModel::new(4, vec![0, 0], vec![3, 3]);
        model.set_arc_cost(&costs);
        model.add_soft_same_vehicle(vec![1, 2], 40);
        let solution = model.solve(&SearchParams::default()).expect("feasible");

        let mut sizes: Vec<usize> = (0..2)
            .map(|vehicle| solution.vehicle_route(vehicle).len() - 2)
            .collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![0, 2], "group was split across vehicles");
        assert_eq!(solution.objective, 14);
    }

    #[test]
    fn time_window_waits_within_slack() {
        // Node 1 opens at t=10; arrival at t=1 must wait.
        let costs = square(&[&[0, 1, 1], &[1, 0, 1], &[1, 1, 0]]);
        let mut model = RoutingModel::new(3, vec![0], vec![2]);
        model.set_arc_cost(&costs);
        let time = model.add_dimension(
            "time",
            DimensionSpec {
                transits: Transits::Shared(&costs),
                slack_max: 100,
                capacities: Capacities::Uniform(100),
                start_cumul_to_zero: false,
            },
        );
        model.set_cumul_range(time, RouteIndex::Node(1), 10, 50);
        model.pin_cumul(time, RouteIndex::Start(0), 0);
        let solution = model.solve(&SearchParams::default()).expect("feasible");

        let stops = solution.vehicle_route(0);
        assert_eq!(stops[1].node, 1);
        assert_eq!(stops[1].cumul(time).min, 10);
    }
}
