//! Persisted graph formats.
//!
//! Two representations of the same logical content:
//!
//! - **Portable**: a JSON document, the source of truth.
//! - **Binary cache**: the same [`GraphData`] encoded with postcard and
//!   compressed with zstd, keyed by the SHA-256 of the portable file it was
//!   built from.
//!
//! [`load_graph`] prefers the cache when its key matches the current source
//! and otherwise parses the JSON and rewrites the cache.  Both paths end in
//! [`GraphData::into_network`], so the resulting network is identical.
//!
//! # Portable format
//!
//! ```json
//! {
//!   "nodes": [{ "id": 101, "lat": 40.71, "lon": -74.00 }],
//!   "edges": [{ "from": 101, "to": 102, "length": 84.2,
//!               "speed_kph": 40.0, "travel_time": 7.6,
//!               "geometry": [[-74.00, 40.71], [-74.001, 40.711]] }]
//! }
//! ```
//!
//! `length`, `speed_kph`, `travel_time` and `geometry` are optional.
//! Geometry pairs are `[lon, lat]`.
//!
//! # Cache layout
//!
//! ```text
//! Header (48 bytes):
//!   - Magic: b"SRGC" (4 bytes)
//!   - Version: u8 (1 byte)
//!   - Reserved: 3 bytes
//!   - Node count: u32 LE (4 bytes)
//!   - Edge count: u32 LE (4 bytes)
//!   - SHA-256 of the portable source (32 bytes)
//!
//! Body:
//!   - postcard-serialized GraphData, zstd compressed
//!
//! Footer (32 bytes):
//!   - SHA-256 checksum of compressed body
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use sr_core::{EdgeId, GeoPoint, NodeId};

use crate::network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

/// Magic bytes identifying a graph cache file.
const CACHE_MAGIC: &[u8; 4] = b"SRGC";

/// Current cache format version.
const CACHE_VERSION: u8 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 48;

/// Checksum size in bytes (SHA-256).
const CHECKSUM_SIZE: usize = 32;

/// zstd compression level (balanced speed/ratio).
const COMPRESSION_LEVEL: i32 = 3;

/// SHA-256 digest of a portable source file.
pub type SourceDigest = [u8; 32];

// ── Records ───────────────────────────────────────────────────────────────────

/// A node as persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id:  u64,
    pub lat: f64,
    pub lon: f64,
}

/// A directed edge as persisted.  Endpoints are node `id`s, not dense
/// indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: u64,
    pub to:   u64,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub speed_kph: Option<f64>,
    #[serde(default)]
    pub travel_time: Option<f64>,
    #[serde(default)]
    pub geometry: Option<Vec<[f64; 2]>>,
}

/// Logical content of a road network, independent of representation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphData {
    /// Parse the portable JSON format.
    pub fn from_json_slice(bytes: &[u8]) -> SpatialResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| SpatialError::MalformedGraph(e.to_string()))
    }

    /// Serialize to the portable JSON format.
    pub fn to_json_vec(&self) -> SpatialResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SpatialError::MalformedGraph(e.to_string()))
    }

    /// Snapshot an in-memory network (e.g. one loaded from OSM).
    pub fn from_network(network: &RoadNetwork) -> Self {
        let nodes = network
            .node_pos
            .iter()
            .zip(&network.node_external_id)
            .map(|(p, &id)| NodeRecord { id, lat: p.lat, lon: p.lon })
            .collect();

        let edges = (0..network.edge_count())
            .map(|i| {
                let e = network.edge(EdgeId(i as u32));
                EdgeRecord {
                    from:        network.node_external_id[e.from.index()],
                    to:          network.node_external_id[e.to.index()],
                    length:      e.attrs.length_m,
                    speed_kph:   e.attrs.speed_kph,
                    travel_time: e.attrs.travel_time_s,
                    geometry:    e.geometry.map(|g| g.iter().map(|p| p.to_lon_lat()).collect()),
                }
            })
            .collect();

        Self { nodes, edges }
    }

    /// Build the network.
    ///
    /// Dense `NodeId`s are assigned in ascending external-id order, so the
    /// lowest external id is also the lowest `NodeId`.  Duplicate node ids
    /// and edges naming unknown nodes are [`SpatialError::MalformedGraph`].
    pub fn into_network(self) -> SpatialResult<RoadNetwork> {
        let mut nodes = self.nodes;
        nodes.sort_by_key(|n| n.id);
        if let Some(dup) = nodes.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(SpatialError::MalformedGraph(format!("duplicate node id {}", dup[0].id)));
        }

        let mut builder = RoadNetworkBuilder::with_capacity(nodes.len(), self.edges.len());
        let mut by_external: FxHashMap<u64, NodeId> =
            FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        for n in &nodes {
            let id = builder.add_node_with_external_id(n.id, GeoPoint::new(n.lat, n.lon));
            by_external.insert(n.id, id);
        }

        let lookup = |ext: u64| {
            by_external
                .get(&ext)
                .copied()
                .ok_or_else(|| SpatialError::MalformedGraph(format!("edge references unknown node {ext}")))
        };

        for e in self.edges {
            let from = lookup(e.from)?;
            let to = lookup(e.to)?;
            let attrs = EdgeAttrs {
                length_m:      e.length,
                speed_kph:     e.speed_kph,
                travel_time_s: e.travel_time,
            };
            match e.geometry {
                Some(g) => builder.add_directed_edge_with_geometry(
                    from,
                    to,
                    attrs,
                    g.into_iter().map(GeoPoint::from_lon_lat).collect(),
                ),
                None => builder.add_directed_edge(from, to, attrs),
            }
        }

        builder.build()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a network from the portable JSON format.
pub fn load_graph_json(path: &Path) -> SpatialResult<RoadNetwork> {
    let bytes = std::fs::read(path)?;
    let network = GraphData::from_json_slice(&bytes)?.into_network()?;
    info!(path = %path.display(), nodes = network.node_count(), edges = network.edge_count(), "loaded road network");
    Ok(network)
}

/// Load a network from `source`, using the binary cache at `cache` when it
/// was built from the same source content.
///
/// A missing, stale, or corrupt cache is never an error: the source is parsed
/// instead and the cache rewritten.  A failed cache write is logged and
/// ignored.  A source that does not build leaves the cache untouched.
pub fn load_graph(source: &Path, cache: Option<&Path>) -> SpatialResult<RoadNetwork> {
    let bytes = std::fs::read(source)?;
    let mut digest: SourceDigest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(&bytes));

    if let Some(cache_path) = cache.filter(|p| p.exists()) {
        match read_cache(cache_path, Some(&digest)) {
            Ok(data) => {
                debug!(cache = %cache_path.display(), "graph cache hit");
                let network = data.into_network()?;
                info!(nodes = network.node_count(), edges = network.edge_count(), "loaded road network from cache");
                return Ok(network);
            }
            Err(e) => warn!(cache = %cache_path.display(), error = %e, "ignoring graph cache"),
        }
    }

    let data = GraphData::from_json_slice(&bytes)?;
    let network = match cache {
        Some(cache_path) => {
            // Only a graph that builds is cached.
            let network = data.clone().into_network()?;
            if let Err(e) = write_cache(&data, &digest, cache_path) {
                warn!(cache = %cache_path.display(), error = %e, "failed to write graph cache");
            }
            network
        }
        None => data.into_network()?,
    };
    info!(path = %source.display(), nodes = network.node_count(), edges = network.edge_count(), "loaded road network");
    Ok(network)
}

/// Write `data` to a cache file keyed by `source_digest`.
pub fn write_cache(data: &GraphData, source_digest: &SourceDigest, path: &Path) -> SpatialResult<()> {
    let cache_err = |message: String| SpatialError::Cache { path: path.to_path_buf(), message };

    let serialized = postcard::to_allocvec(data)
        .map_err(|e| cache_err(format!("postcard serialization failed: {e}")))?;
    let compressed = zstd::encode_all(serialized.as_slice(), COMPRESSION_LEVEL)
        .map_err(|e| cache_err(format!("zstd compression failed: {e}")))?;
    let checksum = Sha256::digest(&compressed);

    let node_count = u32::try_from(data.nodes.len()).map_err(|_| cache_err("too many nodes".into()))?;
    let edge_count = u32::try_from(data.edges.len()).map_err(|_| cache_err("too many edges".into()))?;

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(CACHE_MAGIC);
    header[4] = CACHE_VERSION;
    // bytes 5-7 reserved
    header[8..12].copy_from_slice(&node_count.to_le_bytes());
    header[12..16].copy_from_slice(&edge_count.to_le_bytes());
    header[16..48].copy_from_slice(source_digest);

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&header)?;
    writer.write_all(&compressed)?;
    writer.write_all(&checksum)?;
    writer.flush()?;

    info!(
        path = %path.display(),
        compressed_size = compressed.len(),
        "graph cache written"
    );
    Ok(())
}

/// Read a cache file, verifying magic, version, checksum, and, when
/// `expected_source` is given, that it was built from that source.
pub fn read_cache(path: &Path, expected_source: Option<&SourceDigest>) -> SpatialResult<GraphData> {
    let cache_err = |message: String| SpatialError::Cache { path: path.to_path_buf(), message };

    let bytes = std::fs::read(path)?;
    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(cache_err("file too short".into()));
    }
    let (header, rest) = bytes.split_at(HEADER_SIZE);
    let (compressed, stored_checksum) = rest.split_at(rest.len() - CHECKSUM_SIZE);

    if &header[0..4] != CACHE_MAGIC {
        return Err(cache_err("invalid magic bytes".into()));
    }
    if header[4] != CACHE_VERSION {
        return Err(cache_err(format!(
            "unsupported version {} (expected {CACHE_VERSION})",
            header[4]
        )));
    }
    if let Some(expected) = expected_source {
        if &header[16..48] != expected.as_slice() {
            return Err(cache_err("built from a different source".into()));
        }
    }
    if Sha256::digest(compressed).as_slice() != stored_checksum {
        return Err(cache_err("checksum mismatch - file may be corrupted".into()));
    }

    let decompressed = zstd::decode_all(compressed)
        .map_err(|e| cache_err(format!("zstd decompression failed: {e}")))?;
    let data: GraphData = postcard::from_bytes(&decompressed)
        .map_err(|e| cache_err(format!("postcard deserialization failed: {e}")))?;

    let node_count = u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;
    let edge_count = u32::from_le_bytes([header[12], header[13], header[14], header[15]]) as usize;
    if data.nodes.len() != node_count || data.edges.len() != edge_count {
        return Err(cache_err(format!(
            "header counts {node_count}/{edge_count} do not match body {}/{}",
            data.nodes.len(),
            data.edges.len()
        )));
    }

    Ok(data)
}
