//! Unit tests for sr-engine.

#[cfg(test)]
mod helpers {
    use sr_core::{GeoPoint, NodeId};
    use sr_spatial::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
    use sr_zones::{RiskZone, SeverityTable, ZoneIndex};

    use crate::RoutingEngine;

    pub const A: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };
    pub const B: GeoPoint = GeoPoint { lat: 0.0, lon: 0.001 };
    pub const C: GeoPoint = GeoPoint { lat: 0.01, lon: 0.001 };
    pub const D: GeoPoint = GeoPoint { lat: 0.01, lon: 0.002 };
    pub const E: GeoPoint = GeoPoint { lat: -0.02, lon: 0.0 };

    /// A-B-C-D, two-way, 100 m per edge.  With `detour`, also A-E-D at
    /// 125 m per edge.
    ///
    /// Positions are chosen so that a 111 m zone at B contains the A-B
    /// midpoint and no other edge midpoint.
    pub fn line_network(detour: bool) -> (RoadNetwork, Vec<NodeId>) {
        let mut b = RoadNetworkBuilder::new();
        let mut ids: Vec<NodeId> = [A, B, C, D].into_iter().map(|p| b.add_node(p)).collect();
        b.add_road(ids[0], ids[1], EdgeAttrs::length(100.0));
        b.add_road(ids[1], ids[2], EdgeAttrs::length(100.0));
        b.add_road(ids[2], ids[3], EdgeAttrs::length(100.0));
        if detour {
            let e = b.add_node(E);
            b.add_road(ids[0], e, EdgeAttrs::length(125.0));
            b.add_road(e, ids[3], EdgeAttrs::length(125.0));
            ids.push(e);
        }
        (b.build().unwrap(), ids)
    }

    /// One red zone at B, radius 111.32 m (0.001°).
    pub fn zone_at_b() -> ZoneIndex {
        let zone = RiskZone::new(B, 111.32, "red").unwrap().with_incidents(12);
        ZoneIndex::new(vec![zone], SeverityTable::default()).unwrap()
    }

    pub fn engine(detour: bool) -> RoutingEngine {
        let (network, _) = line_network(detour);
        RoutingEngine::new(network, zone_at_b())
    }
}

// ── End-to-end scenario ───────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use super::helpers::{engine, A, B, C, D, E};
    use crate::{RouteQuery, RoutingMode};

    #[test]
    fn fast_follows_the_line() {
        let route = engine(false).route(&RouteQuery::new(A, D, RoutingMode::Fast)).unwrap();
        assert_eq!(route.coordinates(), &[A, B, C, D]);
        assert_eq!(route.cost(), 300.0);
        assert_eq!(route.distance_m(), 300.0);
        assert_eq!(route.mode(), RoutingMode::Fast);
    }

    #[test]
    fn safe_without_alternative_pays_the_penalty() {
        let route = engine(false).route(&RouteQuery::new(A, D, RoutingMode::Safe)).unwrap();
        assert_eq!(route.coordinates(), &[A, B, C, D]);
        assert_eq!(route.cost(), 600.0);
        assert_eq!(route.distance_m(), 300.0);
    }

    #[test]
    fn safe_prefers_the_detour() {
        let route = engine(true).route(&RouteQuery::new(A, D, RoutingMode::Safe)).unwrap();
        assert_eq!(route.coordinates(), &[A, E, D]);
        assert_eq!(route.cost(), 250.0);
        assert_eq!(route.distance_m(), 250.0);
    }

    #[test]
    fn safe_cost_never_below_fast_cost() {
        let engine = engine(true);
        for (from, to) in [(A, D), (D, A), (B, E), (C, A)] {
            let fast = engine.route(&RouteQuery::new(from, to, RoutingMode::Fast)).unwrap();
            let safe = engine.route(&RouteQuery::new(from, to, RoutingMode::Safe)).unwrap();
            assert!(safe.cost() >= fast.cost(), "{from} -> {to}");
        }
    }

    #[test]
    fn nearby_coordinates_snap_to_nodes() {
        use sr_core::GeoPoint;

        let near_a = GeoPoint::new(0.0001, -0.0001);
        let near_d = GeoPoint::new(0.0101, 0.0021);
        let route = engine(false).route(&RouteQuery::new(near_a, near_d, RoutingMode::Fast)).unwrap();
        assert_eq!(route.coordinates().first(), Some(&A));
        assert_eq!(route.coordinates().last(), Some(&D));
    }

    #[test]
    fn same_start_and_end() {
        let route = engine(false).route(&RouteQuery::new(C, C, RoutingMode::Safe)).unwrap();
        assert_eq!(route.coordinates(), &[C]);
        assert_eq!(route.cost(), 0.0);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let engine = engine(true);
        let q = RouteQuery::new(A, D, RoutingMode::Fast);
        let first = engine.route(&q).unwrap();
        for _ in 0..5 {
            assert_eq!(engine.route(&q).unwrap(), first);
        }
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use sr_core::GeoPoint;
    use sr_spatial::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder, SpatialError};
    use sr_zones::ZoneIndex;

    use crate::{ErrorKind, RouteError, RouteQuery, RoutingEngine, RoutingMode};

    #[test]
    fn unreachable_is_no_path_found() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, EdgeAttrs::length(10.0));
        let engine = RoutingEngine::new(b.build().unwrap(), ZoneIndex::empty());

        let q = RouteQuery::new(GeoPoint::new(0.0, 1.0), GeoPoint::new(0.0, 0.0), RoutingMode::Fast);
        let err = engine.route(&q).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoPathFound);
    }

    #[test]
    fn empty_graph() {
        let engine = RoutingEngine::new(RoadNetwork::empty(), ZoneIndex::empty());
        let q = RouteQuery::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), RoutingMode::Safe);
        assert_eq!(engine.route(&q).unwrap_err().kind, ErrorKind::EmptyGraph);
    }

    #[test]
    fn out_of_range_query_coordinate() {
        let engine = super::helpers::engine(false);
        let q = RouteQuery::new(GeoPoint::new(f64::NAN, 0.0), super::helpers::D, RoutingMode::Fast);
        assert_eq!(engine.route(&q).unwrap_err().kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn spatial_errors_map_to_kinds() {
        use sr_core::NodeId;

        let n = NodeId(3);
        let cases = [
            (SpatialError::NoPath { from: n, to: n }, ErrorKind::NoPathFound),
            (SpatialError::InvalidEndpoint(n), ErrorKind::InvalidEndpoint),
            (SpatialError::NodeNotFound(n), ErrorKind::InvalidEndpoint),
            (SpatialError::EmptyGraph, ErrorKind::EmptyGraph),
            (SpatialError::MalformedGraph("x".into()), ErrorKind::MalformedInput),
        ];
        for (err, kind) in cases {
            assert_eq!(RouteError::from(err).kind, kind);
        }
    }

    #[test]
    fn error_serializes_as_kind_and_message() {
        let err = RouteError::new(ErrorKind::NoPathFound, "no route from 1 to 2");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v, serde_json::json!({ "kind": "NoPathFound", "message": "no route from 1 to 2" }));
        assert_eq!(err.to_string(), "NoPathFound: no route from 1 to 2");
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod request {
    use crate::{ErrorKind, RouteQuery, RouteRequest, RoutingMode};

    #[test]
    fn parses_and_validates() {
        let req = RouteRequest::from_json(r#"{ "start": [0.0, 0.0], "end": [0.01, 0.002], "mode": "Safe" }"#)
            .unwrap();
        let q = req.validate().unwrap();
        assert_eq!(q.mode, RoutingMode::Safe);
        assert_eq!(q.end.lat, 0.01);
        assert_eq!(q.end.lon, 0.002);
    }

    #[test]
    fn missing_mode() {
        let req = RouteRequest::from_json(r#"{ "start": [0, 0], "end": [1, 1] }"#).unwrap();
        assert_eq!(req.validate().unwrap_err().kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn unknown_mode() {
        let req = RouteRequest::new([0.0, 0.0], [1.0, 1.0], "scenic");
        assert_eq!(req.validate().unwrap_err().kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn out_of_range_coordinates() {
        for (start, end) in [([91.0, 0.0], [0.0, 0.0]), ([0.0, 0.0], [0.0, 181.0]), ([0.0, f64::INFINITY], [0.0, 0.0])] {
            let req = RouteRequest::new(start, end, "fast");
            assert_eq!(req.validate().unwrap_err().kind, ErrorKind::MalformedInput);
        }
    }

    #[test]
    fn malformed_body() {
        for body in ["", "{", r#"{ "start": [0], "end": [1, 1], "mode": "fast" }"#, r#"{ "end": [1, 1] }"#] {
            assert_eq!(RouteRequest::from_json(body).unwrap_err().kind, ErrorKind::MalformedInput, "{body}");
        }
    }

    #[test]
    fn query_converts_back_to_request() {
        let q = RouteQuery::new(super::helpers::A, super::helpers::D, RoutingMode::Safe);
        let req = RouteRequest::from(q);
        assert_eq!(req.mode.as_deref(), Some("safe"));
        assert_eq!(req.validate().unwrap(), q);
    }

    #[test]
    fn engine_routes_requests() {
        let engine = super::helpers::engine(true);
        let route = engine.route_request(&RouteRequest::new([0.0, 0.0], [0.01, 0.002], "safe")).unwrap();
        assert_eq!(route.cost(), 250.0);
        let err = engine.route_request(&RouteRequest::new([0.0, 0.0], [0.01, 0.002], "")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod output {
    use serde_json::json;

    use sr_zones::{RiskZone, SeverityTable, ZoneIndex};

    use super::helpers::{engine, line_network, A, B, D};
    use crate::{RouteQuery, RoutingEngine, RoutingMode};

    #[test]
    fn geojson_feature() {
        let route = engine(true).route(&RouteQuery::new(A, D, RoutingMode::Safe)).unwrap();
        let gj = route.to_geojson();
        assert_eq!(gj["type"], "Feature");
        assert_eq!(gj["geometry"]["type"], "LineString");
        assert_eq!(
            gj["geometry"]["coordinates"],
            json!([[0.0, 0.0], [0.0, -0.02], [0.002, 0.01]])
        );
        assert_eq!(gj["properties"]["mode"], "safe");
        assert_eq!(gj["properties"]["cost"], 250.0);
        assert_eq!(gj["properties"]["distance_m"], 250.0);
    }

    #[test]
    fn zones_listing_in_load_order() {
        let listing = engine(false).zones_listing();
        assert_eq!(listing.len(), 1);
        let z = &listing[0];
        assert_eq!((z.lat, z.lon, z.zone.as_str(), z.radius), (0.0, 0.001, "red", 111.32));
        assert_eq!(
            serde_json::to_value(z).unwrap(),
            json!({ "lat": 0.0, "lon": 0.001, "zone": "red", "radius": 111.32, "total_incidents": 12 })
        );
    }

    #[test]
    fn zones_listing_keeps_dataset_label() {
        let (network, _) = line_network(false);
        let zone = RiskZone::new(B, 111.32, " Red ").unwrap();
        let zones = ZoneIndex::new(vec![zone], SeverityTable::default().with("red", 2.0)).unwrap();
        let engine = RoutingEngine::new(network, zones);

        assert_eq!(engine.zones_listing()[0].zone, " Red ");
        assert_eq!(engine.zones().penalty_at(B), 2.0);
    }

    #[test]
    fn batch_preserves_order() {
        let engine = engine(true);
        let queries = [
            RouteQuery::new(A, D, RoutingMode::Fast),
            RouteQuery::new(D, A, RoutingMode::Safe),
            RouteQuery::new(A, A, RoutingMode::Fast),
        ];
        let results = engine.route_batch(&queries);
        assert_eq!(results.len(), 3);
        for (q, r) in queries.iter().zip(&results) {
            assert_eq!(r.as_ref().unwrap(), &engine.route(q).unwrap());
        }
    }
}

// ── Configuration & loading ───────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    use sr_zones::SeverityTable;

    use crate::{EngineConfig, EngineError, LogFormat, LoggingConfig, RouteQuery, RoutingEngine, RoutingMode};

    const GRAPH: &str = r#"{
        "nodes": [
            { "id": 1, "lat": 0.0,  "lon": 0.0 },
            { "id": 2, "lat": 0.0,  "lon": 0.001 },
            { "id": 3, "lat": 0.01, "lon": 0.001 },
            { "id": 4, "lat": 0.01, "lon": 0.002 }
        ],
        "edges": [
            { "from": 1, "to": 2, "length": 100 }, { "from": 2, "to": 1, "length": 100 },
            { "from": 2, "to": 3, "length": 100 }, { "from": 3, "to": 2, "length": 100 },
            { "from": 3, "to": 4, "length": 100 }, { "from": 4, "to": 3, "length": 100 }
        ]
    }"#;

    const ZONES: &str = "lat,lon,radius,zone,total_incidents\n0.0,0.001,111.32,yellow,\n";

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.severity, SeverityTable::default());
        assert_eq!(cfg.logging, LoggingConfig::default());
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.validate().is_err(), "graph_path is required");
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("SAFEROUTE_GRAPH", "/data/g.json"),
            ("SAFEROUTE_ZONES", "/data/z.csv"),
            ("SAFEROUTE_GRAPH_CACHE", ""),
            ("LOG_FORMAT", "JSON"),
        ]
        .into_iter()
        .collect();
        let cfg = EngineConfig { graph_path: Some("g0.json".into()), ..EngineConfig::default() }
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.graph_path, Some(PathBuf::from("/data/g.json")));
        assert_eq!(cfg.zones_path, Some(PathBuf::from("/data/z.csv")));
        assert_eq!(cfg.graph_cache_path, None, "empty values are ignored");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn rejects_bad_severity() {
        let cfg = EngineConfig {
            graph_path: Some("g.json".into()),
            severity: SeverityTable::default().with("yellow", 0.5),
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::Zones(_))));
    }

    #[test]
    fn loads_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let graph = dir.path().join("graph.json");
        let zones = dir.path().join("zones.csv");
        let cache = dir.path().join("graph.srgc");
        let config = dir.path().join("saferoute.json");
        fs::write(&graph, GRAPH).unwrap();
        fs::write(&zones, ZONES).unwrap();
        fs::write(
            &config,
            serde_json::json!({
                "graph_path": graph,
                "graph_cache_path": cache,
                "zones_path": zones,
                "severity": { "multipliers": { "yellow": 2.0 }, "default_multiplier": 4.0 }
            })
            .to_string(),
        )
        .unwrap();

        let cfg = EngineConfig::from_file(&config).unwrap();
        let engine = RoutingEngine::load(&cfg).unwrap();
        assert_eq!(engine.network().node_count(), 4);
        assert_eq!(engine.zones().len(), 1);
        assert!(cache.exists());

        let a = sr_core::GeoPoint::new(0.0, 0.0);
        let d = sr_core::GeoPoint::new(0.01, 0.002);
        let safe = engine.route(&RouteQuery::new(a, d, RoutingMode::Safe)).unwrap();
        assert_eq!(safe.cost(), 400.0); // 100 * 2 + 100 + 100

        // Second load is served from the cache.
        let again = RoutingEngine::load(&cfg).unwrap();
        assert_eq!(again.route(&RouteQuery::new(a, d, RoutingMode::Safe)).unwrap(), safe);
    }

    #[test]
    fn unreadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ graph_path: ").unwrap();
        assert!(matches!(EngineConfig::from_file(&path), Err(EngineError::Config(_))));
        assert!(matches!(
            EngineConfig::from_file(&dir.path().join("missing.json")),
            Err(EngineError::Io(_))
        ));
    }

    #[test]
    fn missing_graph_file() {
        let cfg = EngineConfig { graph_path: Some("/nonexistent/graph.json".into()), ..EngineConfig::default() };
        assert!(matches!(RoutingEngine::load(&cfg), Err(EngineError::Graph(_))));
    }
}
