//! Path → coordinate sequence.

use sr_core::GeoPoint;

use crate::network::RoadNetwork;
use crate::router::Path;
use crate::{SpatialError, SpatialResult};

/// Expand `path` into the ordered coordinates a client draws.
///
/// Each edge contributes its detailed geometry when it has one (at least two
/// points), otherwise the straight segment between its endpoints.  Where one
/// segment ends and the next begins the shared coordinate is emitted once.
/// A single-node path yields that node's coordinate.
pub fn materialize(network: &RoadNetwork, path: &Path) -> SpatialResult<Vec<GeoPoint>> {
    if path.edges.is_empty() {
        return path
            .nodes
            .first()
            .map(|&n| network.node_coordinate(n).map(|p| vec![p]))
            .unwrap_or_else(|| Ok(Vec::new()));
    }

    let mut coords: Vec<GeoPoint> = Vec::with_capacity(path.edges.len() + 1);
    for &e in &path.edges {
        if e.index() >= network.edge_count() {
            return Err(SpatialError::MalformedGraph(format!("path references unknown edge {e}")));
        }
        let edge = network.edge(e);
        let straight;
        let segment: &[GeoPoint] = match edge.geometry {
            Some(g) if g.len() >= 2 => g,
            _ => {
                straight = [network.node_pos[edge.from.index()], network.node_pos[edge.to.index()]];
                &straight
            }
        };

        let skip = usize::from(coords.last() == segment.first());
        coords.extend_from_slice(&segment[skip..]);
    }
    Ok(coords)
}
