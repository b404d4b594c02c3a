//! Edge-cost functions.
//!
//! # Pluggability
//!
//! The router calls costs through the [`CostModel`] trait.  The routing mode
//! selected by a request maps to exactly one implementation through the
//! closed [`ModeCost`] enum, so the mode string is parsed once and never
//! compared again.
//!
//! # Invariant
//!
//! Every cost is finite and `>= 0`; Dijkstra's correctness depends on it.
//! A missing length costs [`FALLBACK_COST`].

use sr_core::{EdgeId, RoutingMode};
use sr_zones::ZoneIndex;

use crate::network::RoadNetwork;

/// Cost of an edge whose length is missing or unusable.
pub const FALLBACK_COST: f64 = 1.0;

// ── CostModel trait ───────────────────────────────────────────────────────────

/// Non-negative weight of a directed edge.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: one cost model serves one request,
/// but many requests run on different threads against the same network.
pub trait CostModel: Send + Sync {
    /// Cost of traversing `edge`.  Must be finite and `>= 0`.
    fn edge_cost(&self, network: &RoadNetwork, edge: EdgeId) -> f64;
}

/// Edge length in metres, or [`FALLBACK_COST`] if it is missing, negative,
/// or not finite.
#[inline]
pub fn base_cost(network: &RoadNetwork, edge: EdgeId) -> f64 {
    network.edge_attrs[edge.index()]
        .length_m
        .filter(|l| l.is_finite() && *l >= 0.0)
        .unwrap_or(FALLBACK_COST)
}

// ── DistanceCost ──────────────────────────────────────────────────────────────

/// Plain physical distance.
#[derive(Copy, Clone, Debug, Default)]
pub struct DistanceCost;

impl CostModel for DistanceCost {
    #[inline]
    fn edge_cost(&self, network: &RoadNetwork, edge: EdgeId) -> f64 {
        base_cost(network, edge)
    }
}

// ── SafeCost ──────────────────────────────────────────────────────────────────

/// Distance scaled by the risk penalty at the edge's midpoint.
///
/// The midpoint is the mean of the two endpoint coordinates, so a long edge
/// that only clips a zone near one end is not penalised.  Penalties are
/// `>= 1`, hence `SafeCost >= DistanceCost` for every edge.
#[derive(Copy, Clone)]
pub struct SafeCost<'z> {
    zones: &'z ZoneIndex,
}

impl<'z> SafeCost<'z> {
    pub fn new(zones: &'z ZoneIndex) -> Self {
        Self { zones }
    }
}

impl CostModel for SafeCost<'_> {
    fn edge_cost(&self, network: &RoadNetwork, edge: EdgeId) -> f64 {
        let i = edge.index();
        let from = network.node_pos[network.edge_from[i].index()];
        let to   = network.node_pos[network.edge_to[i].index()];
        let cost = base_cost(network, edge) * self.zones.penalty_at(from.midpoint(to));
        if cost.is_finite() { cost } else { f64::MAX }
    }
}

// ── ModeCost ──────────────────────────────────────────────────────────────────

/// The cost model for a [`RoutingMode`].
#[derive(Copy, Clone)]
pub enum ModeCost<'z> {
    Distance(DistanceCost),
    Safe(SafeCost<'z>),
}

impl<'z> ModeCost<'z> {
    /// Select the cost model for `mode`.  `zones` is only consulted in safe
    /// mode.
    pub fn for_mode(mode: RoutingMode, zones: &'z ZoneIndex) -> Self {
        match mode {
            RoutingMode::Fast => ModeCost::Distance(DistanceCost),
            RoutingMode::Safe => ModeCost::Safe(SafeCost::new(zones)),
        }
    }

    pub fn mode(&self) -> RoutingMode {
        match self {
            ModeCost::Distance(_) => RoutingMode::Fast,
            ModeCost::Safe(_) => RoutingMode::Safe,
        }
    }
}

impl CostModel for ModeCost<'_> {
    #[inline]
    fn edge_cost(&self, network: &RoadNetwork, edge: EdgeId) -> f64 {
        match self {
            ModeCost::Distance(c) => c.edge_cost(network, edge),
            ModeCost::Safe(c) => c.edge_cost(network, edge),
        }
    }
}
