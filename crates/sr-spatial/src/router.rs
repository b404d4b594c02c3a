//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Callers route through the [`Router`] trait, so an A* or contraction
//! hierarchy implementation can replace [`DijkstraRouter`] without touching
//! the request pipeline.  Costs are supplied per call through a
//! [`CostModel`], which is why no geometric heuristic is baked in: safe-mode
//! weights are not bounded by straight-line distance.
//!
//! # Determinism
//!
//! Frontier entries are ordered by `(cost, NodeId)`; edges are relaxed in CSR
//! order with a strict `<`.  Identical inputs always give identical paths.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use sr_core::{EdgeId, NodeId};

use crate::cost::{base_cost, CostModel};
use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a routing query: the visited nodes, the edge chosen between
/// each consecutive pair, and the total cost under the model used.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Nodes from origin to destination, both included.
    pub nodes: Vec<NodeId>,
    /// `edges[i]` connects `nodes[i]` to `nodes[i + 1]`.
    pub edges: Vec<EdgeId>,
    /// Sum of edge costs under the cost model that produced this path.
    pub total_cost: f64,
}

impl Path {
    /// Build a path from a node sequence, choosing the shortest of any
    /// parallel edges between each pair.  `total_cost` is plain distance.
    ///
    /// Fails with [`SpatialError::NoEdge`] if a consecutive pair is not
    /// connected in that direction.
    pub fn from_nodes(network: &RoadNetwork, nodes: Vec<NodeId>) -> SpatialResult<Path> {
        if nodes.is_empty() {
            return Err(SpatialError::MalformedGraph("path has no nodes".into()));
        }
        for &n in &nodes {
            if !network.contains(n) {
                return Err(SpatialError::NodeNotFound(n));
            }
        }

        let mut edges = Vec::with_capacity(nodes.len() - 1);
        let mut total_cost = 0.0;
        for pair in nodes.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let edge = network
                .edges_between(from, to)
                .min_by(|a, b| base_cost(network, *a).total_cmp(&base_cost(network, *b)))
                .ok_or(SpatialError::NoEdge { from, to })?;
            total_cost += base_cost(network, edge);
            edges.push(edge);
        }
        Ok(Path { nodes, edges, total_cost })
    }

    pub fn origin(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// `true` if the origin and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Physical length in metres.  Edges without a recorded length count
    /// their straight-line (haversine) length.
    pub fn distance_m(&self, network: &RoadNetwork) -> f64 {
        self.edges
            .iter()
            .map(|&e| {
                let edge = network.edge(e);
                edge.attrs.length_m.unwrap_or_else(|| {
                    network.node_pos[edge.from.index()].distance_m(network.node_pos[edge.to.index()])
                })
            })
            .sum()
    }

    /// Re-price this path under another cost model.
    pub fn cost_under(&self, network: &RoadNetwork, cost: &dyn CostModel) -> f64 {
        self.edges.iter().map(|&e| cost.edge_cost(network, e)).sum()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable single-pair shortest-path search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can serve concurrent
/// requests against a shared network.
pub trait Router: Send + Sync {
    /// Compute the cheapest path from `origin` to `destination` under `cost`.
    ///
    /// - `origin == destination` yields a single-node path with cost 0.
    /// - An endpoint outside the network yields
    ///   [`SpatialError::InvalidEndpoint`].
    /// - An unreachable destination yields [`SpatialError::NoPath`].
    fn shortest_path(
        &self,
        network: &RoadNetwork,
        origin: NodeId,
        destination: NodeId,
        cost: &dyn CostModel,
    ) -> SpatialResult<Path>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_path(
        &self,
        network: &RoadNetwork,
        origin: NodeId,
        destination: NodeId,
        cost: &dyn CostModel,
    ) -> SpatialResult<Path> {
        dijkstra(network, origin, destination, cost)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// `f64` with a total order, for use as a heap key.
#[derive(Copy, Clone, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    cost_model: &dyn CostModel,
) -> SpatialResult<Path> {
    for endpoint in [from, to] {
        if !network.contains(endpoint) {
            return Err(SpatialError::InvalidEndpoint(endpoint));
        }
    }

    if from == to {
        return Ok(Path { nodes: vec![from], edges: vec![], total_cost: 0.0 });
    }

    let n = network.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_edge, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let step = cost_model.edge_cost(network, edge);
            debug_assert!(step >= 0.0, "negative edge cost {step} on {edge}");
            let new_cost = cost + step;

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(SpatialError::NoPath { from, to })
}

fn reconstruct(
    network: &RoadNetwork,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_cost: f64,
) -> Path {
    let mut edges = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = network.edge_from[e.index()];
        nodes.push(cur);
    }
    edges.reverse();
    nodes.reverse();
    Path { nodes, edges, total_cost }
}
