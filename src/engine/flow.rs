//! Min-cost flow over unit-capacity arcs.
//!
//! Nodes carry supplies (positive = source, negative = sink); every arc has
//! capacity one and a per-unit cost. The solver augments one unit at a time
//! along Bellman-Ford shortest paths in the residual graph, which handles
//! negative arc costs and terminates because each augmentation settles one
//! unit of supply.

/// Result of a flow solve.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// All supplies satisfied at minimum total cost; `flows[i]` is the
    /// flow (0 or 1) on input arc `i`.
    Optimal { total_cost: i64, flows: Vec<i64> },
    /// Supplies cannot be satisfied (unbalanced or disconnected).
    Infeasible,
}

struct ResidualArc {
    head: usize,
    capacity: i64,
    cost: i64,
    /// Index of the paired reverse arc.
    reverse: usize,
}

/// A min-cost flow network under construction.
#[derive(Default)]
pub struct MinCostFlow {
    graph: Vec<Vec<ResidualArc>>,
    supplies: Vec<i64>,
    /// (tail, arc slot) of each input arc, for flow read-back.
    input_arcs: Vec<(usize, usize)>,
}

impl MinCostFlow {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, node: usize) {
        if node >= self.graph.len() {
            self.graph.resize_with(node + 1, Vec::new);
            self.supplies.resize(node + 1, 0);
        }
    }

    /// Add a unit-capacity arc with a per-unit cost.
    pub fn add_arc(&mut self, tail: usize, head: usize, cost: i64) {
        self.ensure_node(tail.max(head));
        let forward_slot = self.graph[tail].len();
        let reverse_slot = self.graph[head].len();
        self.graph[tail].push(ResidualArc {
            head,
            capacity: 1,
            cost,
            reverse: reverse_slot,
        });
        self.graph[head].push(ResidualArc {
            head: tail,
            capacity: 0,
            cost: -cost,
            reverse: forward_slot,
        });
        self.input_arcs.push((tail, forward_slot));
    }

    /// Set a node's supply (positive) or demand (negative).
    pub fn set_supply(&mut self, node: usize, supply: i64) {
        self.ensure_node(node);
        self.supplies[node] = supply;
    }

    /// Solve to optimality.
    pub fn solve(&mut self) -> FlowOutcome {
        if self.supplies.iter().sum::<i64>() != 0 {
            return FlowOutcome::Infeasible;
        }
        let mut excess = self.supplies.clone();
        let mut total_cost = 0;

        while let Some(source) = excess.iter().position(|&e| e > 0) {
            match self.shortest_path_to_deficit(source, &excess) {
                Some((sink, path)) => {
                    for &(node, slot) in &path {
                        let (head, cost) = {
                            let arc = &self.graph[node][slot];
                            (arc.head, arc.cost)
                        };
                        let reverse = self.graph[node][slot].reverse;
                        self.graph[node][slot].capacity -= 1;
                        self.graph[head][reverse].capacity += 1;
                        total_cost += cost;
                    }
                    excess[source] -= 1;
                    excess[sink] += 1;
                }
                None => return FlowOutcome::Infeasible,
            }
        }

        let flows = self
            .input_arcs
            .iter()
            .map(|&(tail, slot)| 1 - self.graph[tail][slot].capacity)
            .collect();
        FlowOutcome::Optimal { total_cost, flows }
    }

    /// Bellman-Ford from `source` to the nearest node with negative excess.
    /// Returns the sink and the arc path as (node, arc slot) pairs.
    fn shortest_path_to_deficit(
        &self,
        source: usize,
        excess: &[i64],
    ) -> Option<(usize, Vec<(usize, usize)>)> {
        let n = self.graph.len();
        let mut distance = vec![i64::MAX; n];
        let mut predecessor: Vec<Option<(usize, usize)>> = vec![None; n];
        distance[source] = 0;

        for _ in 0..n {
            let mut relaxed = false;
            for node in 0..n {
                if distance[node] == i64::MAX {
                    continue;
                }
                for (slot, arc) in self.graph[node].iter().enumerate() {
                    if arc.capacity <= 0 {
                        continue;
                    }
                    let candidate = distance[node] + arc.cost;
                    if candidate < distance[arc.head] {
                        distance[arc.head] = candidate;
                        predecessor[arc.head] = Some((node, slot));
                        relaxed = true;
                    }
                }
            }
            if !relaxed {
                break;
            }
        }

        let sink = (0..n)
            .filter(|&node| excess[node] < 0 && distance[node] < i64::MAX)
            .min_by_key(|&node| distance[node])?;

        let mut path = Vec::new();
        let mut node = sink;
        while node != source {
            let (previous, slot) = predecessor[node]?;
            path.push((previous, slot));
            node = previous;
        }
        path.reverse();
        Some((sink, path))
    }
}
