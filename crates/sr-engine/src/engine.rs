//! The routing engine: immutable graph + zones, one method per request.
//!
//! # Request pipeline
//!
//! ```text
//! RouteQuery
//!   ├─ nearest_node(start), nearest_node(end)   (RoadNetwork R-tree)
//!   ├─ ModeCost::for_mode(mode, zones)
//!   ├─ Router::shortest_path                    (Dijkstra by default)
//!   ├─ materialize                              (path → coordinates)
//!   └─ Route
//! ```
//!
//! # Sharing
//!
//! Nothing is mutated after construction, so one engine behind an `Arc`
//! serves any number of concurrent requests.  Several engines with different
//! graphs can coexist in one process.

use std::path::Path;

use tracing::{debug, info};

use sr_spatial::{materialize, DijkstraRouter, ModeCost, RoadNetwork, Router};
use sr_zones::{load_zones_path, ZoneIndex};

use crate::config::EngineConfig;
use crate::query::{RouteQuery, RouteRequest};
use crate::route::{Route, ZoneListing};
use crate::{EngineError, EngineResult, RouteResult};

/// Road network, risk zones and path finder, built once.
pub struct RoutingEngine<R: Router = DijkstraRouter> {
    network: RoadNetwork,
    zones:   ZoneIndex,
    router:  R,
}

impl RoutingEngine<DijkstraRouter> {
    pub fn new(network: RoadNetwork, zones: ZoneIndex) -> Self {
        Self::with_router(network, zones, DijkstraRouter)
    }

    /// Load the graph and zones named by `config`.
    ///
    /// The config is validated first.  Without `zones_path` the engine has no
    /// zones and safe mode degenerates to distance.
    pub fn load(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let graph_path = config
            .graph_path
            .as_deref()
            .ok_or_else(|| EngineError::Config("graph_path is not set".into()))?;

        let network = load_network(graph_path, config.graph_cache_path.as_deref())?;

        let zones = match &config.zones_path {
            Some(path) => load_zones_path(path)?,
            None => Vec::new(),
        };
        let zones = ZoneIndex::new(zones, config.severity.clone())?;

        info!(
            nodes = network.node_count(),
            edges = network.edge_count(),
            zones = zones.len(),
            "routing engine ready"
        );
        Ok(Self::new(network, zones))
    }
}

#[cfg(feature = "osm")]
fn load_network(path: &Path, cache: Option<&Path>) -> EngineResult<RoadNetwork> {
    if path.to_string_lossy().ends_with(".pbf") {
        return Ok(sr_spatial::osm::load_from_pbf(path)?);
    }
    Ok(sr_spatial::load_graph(path, cache)?)
}

#[cfg(not(feature = "osm"))]
fn load_network(path: &Path, cache: Option<&Path>) -> EngineResult<RoadNetwork> {
    if path.to_string_lossy().ends_with(".pbf") {
        return Err(EngineError::Config(format!(
            "{} looks like an OSM extract; rebuild with the `osm` feature",
            path.display()
        )));
    }
    Ok(sr_spatial::load_graph(path, cache)?)
}

impl<R: Router> RoutingEngine<R> {
    /// Use a custom path finder.
    pub fn with_router(network: RoadNetwork, zones: ZoneIndex, router: R) -> Self {
        Self { network, zones, router }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn zones(&self) -> &ZoneIndex {
        &self.zones
    }

    /// Compute one route.
    ///
    /// Start and end snap to their nearest nodes.  When both snap to the same
    /// node the route is that single coordinate with cost 0.
    pub fn route(&self, query: &RouteQuery) -> RouteResult<Route> {
        let origin = self.network.nearest_node(query.start)?;
        let destination = self.network.nearest_node(query.end)?;

        let cost = ModeCost::for_mode(query.mode, &self.zones);
        let path = self.router.shortest_path(&self.network, origin, destination, &cost)?;
        let coordinates = materialize(&self.network, &path)?;
        let distance_m = path.distance_m(&self.network);

        debug!(
            mode = %query.mode,
            %origin,
            %destination,
            nodes = path.nodes.len(),
            distance_m,
            cost = path.total_cost,
            "route computed"
        );
        Ok(Route::new(coordinates, query.mode, distance_m, path.total_cost))
    }

    /// Validate and route a wire-format request.
    pub fn route_request(&self, request: &RouteRequest) -> RouteResult<Route> {
        let query = request.validate()?;
        self.route(&query)
    }

    /// Route every query independently.  Results are in query order.
    pub fn route_batch(&self, queries: &[RouteQuery]) -> Vec<RouteResult<Route>> {
        #[cfg(not(feature = "parallel"))]
        {
            queries.iter().map(|q| self.route(q)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            queries.par_iter().map(|q| self.route(q)).collect()
        }
    }

    /// All zones in load order.
    pub fn zones_listing(&self) -> Vec<ZoneListing> {
        self.zones.zones().iter().map(ZoneListing::from).collect()
    }
}
