//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use sr_spatial::osm::load_from_pbf;
//!
//! let network = load_from_pbf(Path::new("city.osm.pbf"))?;
//! ```
//!
//! # What is loaded
//!
//! Only drivable `highway=*` ways are included.  `maxspeed` overrides the
//! class speed.  One-way roads (`oneway=yes|-1`, motorways, roundabouts) add
//! a single directed edge in the signed direction; two-way roads add both.  Each edge carries its haversine length, the assumed speed,
//! and the resulting travel time.  OSM node ids become external ids, and
//! dense `NodeId`s follow ascending OSM id.  Files with negative node ids
//! are rejected.
//!
//! Pair with [`crate::io::GraphData::from_network`] to write the result to the
//! portable format.

use std::collections::HashMap;
use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;
use tracing::info;

use sr_core::{GeoPoint, NodeId};

use crate::network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::SpatialError;

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a road network from an OSM PBF file.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on parse errors and
/// [`SpatialError::MalformedGraph`] if the resulting graph is invalid.
pub fn load_from_pbf(path: &Path) -> Result<RoadNetwork, SpatialError> {
    // ── Phase 1: collect all OSM nodes + road ways in one sequential pass ──
    let reader = ElementReader::from_path(path).map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                if let Some(road) = RoadTags::classify(&tags) {
                    let mut refs: Vec<i64> = w.refs().collect();
                    if road.direction == Direction::Backward {
                        refs.reverse();
                    }
                    road_ways.push(OsmWay { refs, speed_kph: road.speed_kph, oneway: road.direction != Direction::Both });
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    // ── Phase 2: road-referenced node ids, ascending ──────────────────────
    let mut road_node_ids: Vec<i64> = road_ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .collect();
    road_node_ids.sort_unstable();
    road_node_ids.dedup();

    // ── Phase 3: build network ────────────────────────────────────────────
    let mut builder = RoadNetworkBuilder::with_capacity(road_node_ids.len(), road_node_ids.len() * 2);
    let mut osm_to_sr: FxHashMap<i64, NodeId> =
        FxHashMap::with_capacity_and_hasher(road_node_ids.len(), Default::default());

    for osm_id in &road_node_ids {
        if let Some(&pos) = all_nodes.get(osm_id) {
            let id = builder.add_node_with_external_id(external_id(*osm_id)?, pos);
            osm_to_sr.insert(*osm_id, id);
        }
    }

    drop(all_nodes);
    drop(road_node_ids);

    for way in &road_ways {
        for window in way.refs.windows(2) {
            if let (Some(&from), Some(&to)) = (osm_to_sr.get(&window[0]), osm_to_sr.get(&window[1])) {
                let length_m = builder.node_pos(from).distance_m(builder.node_pos(to));
                let attrs = EdgeAttrs {
                    length_m:      Some(length_m),
                    speed_kph:     Some(way.speed_kph),
                    travel_time_s: Some(length_m / (way.speed_kph / 3.6)),
                };

                builder.add_directed_edge(from, to, attrs);
                if !way.oneway {
                    builder.add_directed_edge(to, from, attrs);
                }
            }
        }
    }

    let network = builder.build()?;
    info!(path = %path.display(), ways = road_ways.len(), "loaded OSM road network");
    Ok(network)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:      Vec<i64>,
    speed_kph: f64,
    oneway:    bool,
}

/// OSM node id as an external id.  Negative ids mark editor-local data that
/// was never uploaded; they would break ascending-id ordering, so such files
/// are rejected.
fn external_id(osm_id: i64) -> Result<u64, SpatialError> {
    u64::try_from(osm_id)
        .map_err(|_| SpatialError::Osm(format!("negative node id {osm_id} (unsaved editor data)")))
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Both,
    /// Along the way's node order.
    Forward,
    /// Against it (`oneway=-1`).
    Backward,
}

/// Routing-relevant reading of a way's tags.
#[derive(Copy, Clone, Debug, PartialEq)]
struct RoadTags {
    speed_kph: f64,
    direction: Direction,
}

impl RoadTags {
    /// `None` for ways that are not drivable roads.
    fn classify(tags: &[(&str, &str)]) -> Option<Self> {
        let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);

        let highway = tag("highway")?;
        let class_speed = class_speed_kph(highway)?;
        let speed_kph = tag("maxspeed").and_then(parse_maxspeed).unwrap_or(class_speed);

        let direction = match tag("oneway") {
            Some("yes" | "1" | "true") => Direction::Forward,
            Some("-1" | "reverse") => Direction::Backward,
            Some("no" | "false" | "0") => Direction::Both,
            _ if matches!(highway, "motorway" | "motorway_link") => Direction::Forward,
            _ if tag("junction") == Some("roundabout") => Direction::Forward,
            _ => Direction::Both,
        };

        Some(Self { speed_kph, direction })
    }
}

/// Typical speed for a `highway` class, `None` if cars cannot use it.
fn class_speed_kph(highway: &str) -> Option<f64> {
    let kph = match highway {
        "motorway" | "motorway_link" => 105.0,
        "trunk" | "trunk_link" => 88.0,
        "primary" | "primary_link" => 72.0,
        "secondary" | "secondary_link" => 64.0,
        "tertiary" | "tertiary_link" => 48.0,
        "service" | "unclassified" => 24.0,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" | "bridleway"
        | "corridor" | "proposed" | "construction" => return None,
        _ => 32.0,
    };
    Some(kph)
}

/// `"50"`, `"50 km/h"` or `"30 mph"`.  Anything else (`"signals"`, `"none"`)
/// falls back to the class speed.
fn parse_maxspeed(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (number, factor) = match raw.strip_suffix("mph") {
        Some(n) => (n, 1.609_344),
        None => (raw.trim_end_matches("km/h").trim_end_matches("kph"), 1.0),
    };
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footways_are_skipped() {
        assert_eq!(RoadTags::classify(&[("highway", "footway")]), None);
        assert_eq!(RoadTags::classify(&[("name", "Main St")]), None);
    }

    #[test]
    fn direction_from_tags() {
        let dir = |tags: &[(&str, &str)]| RoadTags::classify(tags).map(|r| r.direction);
        assert_eq!(dir(&[("highway", "residential")]), Some(Direction::Both));
        assert_eq!(dir(&[("highway", "residential"), ("oneway", "yes")]), Some(Direction::Forward));
        assert_eq!(dir(&[("highway", "residential"), ("oneway", "-1")]), Some(Direction::Backward));
        assert_eq!(dir(&[("highway", "motorway")]), Some(Direction::Forward));
        assert_eq!(dir(&[("highway", "motorway"), ("oneway", "no")]), Some(Direction::Both));
        assert_eq!(dir(&[("highway", "primary"), ("junction", "roundabout")]), Some(Direction::Forward));
    }

    #[test]
    fn negative_node_ids_are_rejected() {
        assert_eq!(external_id(0).unwrap(), 0);
        assert_eq!(external_id(i64::MAX).unwrap(), i64::MAX as u64);
        assert!(matches!(external_id(-42), Err(SpatialError::Osm(_))));
    }

    #[test]
    fn maxspeed_overrides_class() {
        let speed = |tags: &[(&str, &str)]| RoadTags::classify(tags).map(|r| r.speed_kph);
        assert_eq!(speed(&[("highway", "primary")]), Some(72.0));
        assert_eq!(speed(&[("highway", "primary"), ("maxspeed", "50")]), Some(50.0));
        assert_eq!(speed(&[("highway", "primary"), ("maxspeed", "40 km/h")]), Some(40.0));
        assert_eq!(speed(&[("highway", "primary"), ("maxspeed", "signals")]), Some(72.0));
        let mph = speed(&[("highway", "primary"), ("maxspeed", "30 mph")]).unwrap();
        assert!((mph - 48.28).abs() < 0.01);
    }
}
