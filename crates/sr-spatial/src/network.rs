//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_attrs`, geometry) are
//! sorted by source node and indexed by `EdgeId`.  Edges from the same node
//! keep their insertion order (stable sort), so iteration order, and with it
//! the search's tie-breaking, depends only on the input.
//!
//! Edges are directed.  A two-way street is two edges; nothing here adds a
//! reverse edge implicitly.  Parallel edges between the same pair are kept.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! on every request to resolve raw start/end coordinates to graph nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::info;

use sr_core::{EdgeId, GeoPoint, NodeId};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Edge attributes ───────────────────────────────────────────────────────────

/// Per-edge attributes carried from the source data.
///
/// Only `length_m` feeds routing.  Speed and travel time are kept for
/// consumers that want them; a missing length is legal and is costed by the
/// fallback in [`crate::cost`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeAttrs {
    pub length_m:      Option<f64>,
    pub speed_kph:     Option<f64>,
    pub travel_time_s: Option<f64>,
}

impl EdgeAttrs {
    /// Attributes with only a length.
    pub fn length(length_m: f64) -> Self {
        Self { length_m: Some(length_m), ..Self::default() }
    }
}

/// Borrowed view of one directed edge.
#[derive(Copy, Clone, Debug)]
pub struct EdgeRef<'a> {
    pub id:       EdgeId,
    pub from:     NodeId,
    pub to:       NodeId,
    pub attrs:    &'a EdgeAttrs,
    /// Detailed road geometry including both endpoints, if the source had one.
    pub geometry: Option<&'a [GeoPoint]>,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node lookup.
///
/// Immutable once built; share it by reference (or `Arc`) across threads.
/// Do not construct directly; use [`RoadNetworkBuilder`].  The arrays are
/// crate-private so they cannot drift from the CSR offsets and the R-tree;
/// read them through [`node_coordinate`](Self::node_coordinate) and
/// [`edge`](Self::edge).
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub(crate) node_pos: Vec<GeoPoint>,

    /// Identifier of each node in the source data (e.g. OSM node id).
    pub(crate) node_external_id: Vec<u64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub(crate) node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// route reconstruction (trace `prev_edge` back to source).
    pub(crate) edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub(crate) edge_to: Vec<NodeId>,

    /// Length / speed / travel time of each edge.
    pub(crate) edge_attrs: Vec<EdgeAttrs>,

    /// Optional detailed geometry of each edge.
    edge_geometry: Vec<Option<Box<[GeoPoint]>>>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    ///
    /// Any nearest-node query against it fails with
    /// [`SpatialError::EmptyGraph`].
    pub fn empty() -> Self {
        Self {
            node_pos:         Vec::new(),
            node_external_id: Vec::new(),
            node_out_start:   vec![0],
            edge_from:        Vec::new(),
            edge_to:          Vec::new(),
            edge_attrs:       Vec::new(),
            edge_geometry:    Vec::new(),
            spatial_idx:      RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    // ── Node queries ──────────────────────────────────────────────────────

    /// Coordinate of `node`.
    pub fn node_coordinate(&self, node: NodeId) -> SpatialResult<GeoPoint> {
        self.node_pos
            .get(node.index())
            .copied()
            .ok_or(SpatialError::NodeNotFound(node))
    }

    /// Source-data identifier of `node`.
    pub fn external_id(&self, node: NodeId) -> SpatialResult<u64> {
        self.node_external_id
            .get(node.index())
            .copied()
            .ok_or(SpatialError::NodeNotFound(node))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range with no heap allocation.  `node` must be
    /// in range; use [`edges_from`](Self::edges_from) for a checked variant.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Outgoing adjacency of `node` as `(neighbour, attributes)` views.
    pub fn edges_from(&self, node: NodeId) -> SpatialResult<impl Iterator<Item = EdgeRef<'_>> + '_> {
        if !self.contains(node) {
            return Err(SpatialError::NodeNotFound(node));
        }
        Ok(self.out_edges(node).map(move |e| self.edge(e)))
    }

    /// View of edge `edge`.
    ///
    /// # Panics
    /// Panics if `edge` is out of range.
    #[inline]
    pub fn edge(&self, edge: EdgeId) -> EdgeRef<'_> {
        let i = edge.index();
        EdgeRef {
            id:       edge,
            from:     self.edge_from[i],
            to:       self.edge_to[i],
            attrs:    &self.edge_attrs[i],
            geometry: self.edge_geometry[i].as_deref(),
        }
    }

    /// All parallel edges from `from` to `to`, in CSR order.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let range = if self.contains(from) {
            self.node_out_start[from.index()] as usize..self.node_out_start[from.index() + 1] as usize
        } else {
            0..0
        };
        range
            .map(|i| EdgeId(i as u32))
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest road node to `pos`.
    ///
    /// Among nodes at exactly the same distance the lowest `NodeId` wins, so
    /// the answer does not depend on R-tree layout.
    pub fn nearest_node(&self, pos: GeoPoint) -> SpatialResult<NodeId> {
        GeoPoint::checked(pos.lat, pos.lon)?;

        let mut candidates = self
            .spatial_idx
            .nearest_neighbor_iter_with_distance_2(&[pos.lat, pos.lon]);
        let (first, best_d2) = candidates.next().ok_or(SpatialError::EmptyGraph)?;

        let mut best = first.id;
        for (entry, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Ok(best)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance
    /// and then by `NodeId`, so the first entry agrees with
    /// [`nearest_node`](Self::nearest_node).
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> SpatialResult<Vec<NodeId>> {
        GeoPoint::checked(pos.lat, pos.lon)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        // Keep pulling past the k-th node while distances still tie with it.
        let mut found: Vec<(f64, NodeId)> = Vec::with_capacity(k);
        for (entry, d2) in self.spatial_idx.nearest_neighbor_iter_with_distance_2(&[pos.lat, pos.lon]) {
            if found.len() >= k && d2 > found[k - 1].0 {
                break;
            }
            found.push((d2, entry.id));
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.truncate(k);
        Ok(found.into_iter().map(|(_, id)| id).collect())
    }
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::empty()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates the edges, sorts them by source node, constructs the CSR arrays,
/// and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use sr_core::GeoPoint;
/// use sr_spatial::{EdgeAttrs, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(40.71, -74.00));
/// let c = b.add_node(GeoPoint::new(40.72, -74.01));
/// b.add_road(a, c, EdgeAttrs::length(1_200.0));
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:        Vec<GeoPoint>,
    external_ids: Vec<u64>,
    raw_edges:    Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    attrs:    EdgeAttrs,
    geometry: Option<Box<[GeoPoint]>>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), external_ids: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:        Vec::with_capacity(nodes),
            external_ids: Vec::with_capacity(nodes),
            raw_edges:    Vec::with_capacity(edges),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).  The
    /// external id defaults to the dense id.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let external = self.nodes.len() as u64;
        self.add_node_with_external_id(external, pos)
    }

    /// Add a road node that keeps its source-data identifier.
    pub fn add_node_with_external_id(&mut self, external_id: u64, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.external_ids.push(external_id);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) {
        self.raw_edges.push(RawEdge { from, to, attrs, geometry: None });
    }

    /// Add a directed edge with a detailed geometry.  The geometry should run
    /// from `from` to `to` and include both endpoints.
    pub fn add_directed_edge_with_geometry(
        &mut self,
        from: NodeId,
        to: NodeId,
        attrs: EdgeAttrs,
        geometry: Vec<GeoPoint>,
    ) {
        self.raw_edges.push(RawEdge { from, to, attrs, geometry: Some(geometry.into_boxed_slice()) });
    }

    /// Convenience: add edges in **both directions** for an undirected road
    /// segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: EdgeAttrs) {
        self.add_directed_edge(a, b, attrs);
        self.add_directed_edge(b, a, attrs);
    }

    /// Look up the position of a node added earlier (used by loaders to
    /// compute edge lengths between adjacent nodes).
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Fails with [`SpatialError::MalformedGraph`] if a node coordinate is
    /// not finite, an edge references a node that was never added, or an
    /// edge carries a negative or non-finite length.
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        if u32::try_from(node_count).is_err() || u32::try_from(edge_count).is_err() {
            return Err(SpatialError::MalformedGraph(format!(
                "{node_count} nodes / {edge_count} edges exceed the u32 id space"
            )));
        }

        if let Some((i, p)) = self
            .nodes
            .iter()
            .enumerate()
            .find(|(_, p)| !p.lat.is_finite() || !p.lon.is_finite())
        {
            return Err(SpatialError::MalformedGraph(format!("node {i} has non-finite coordinate {p}")));
        }

        for e in &self.raw_edges {
            if e.from.index() >= node_count || e.to.index() >= node_count {
                return Err(SpatialError::MalformedGraph(format!(
                    "edge {} -> {} references a missing node",
                    e.from, e.to
                )));
            }
            if let Some(len) = e.attrs.length_m {
                if !len.is_finite() || len < 0.0 {
                    return Err(SpatialError::MalformedGraph(format!(
                        "edge {} -> {} has invalid length {len}",
                        e.from, e.to
                    )));
                }
            }
        }

        // Stable sort by source node: keeps per-node insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:  Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:    Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_attrs: Vec<EdgeAttrs> = raw.iter().map(|e| e.attrs).collect();
        let edge_geometry: Vec<Option<Box<[GeoPoint]>>> =
            raw.into_iter().map(|e| e.geometry).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        info!(nodes = node_count, edges = edge_count, "built road network");

        Ok(RoadNetwork {
            node_pos: self.nodes,
            node_external_id: self.external_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_attrs,
            edge_geometry,
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
