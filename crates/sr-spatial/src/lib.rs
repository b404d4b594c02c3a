//! `sr-spatial`: road network, nearest-node lookup, costs, and routing.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`network`]     | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`, `nearest_node` |
//! | [`cost`]        | `CostModel` trait, `DistanceCost`, `SafeCost`, `ModeCost`  |
//! | [`router`]      | `Router` trait, `Path`, `DijkstraRouter`                   |
//! | [`materialize`] | `materialize`: path → coordinate sequence                  |
//! | [`io`]          | Portable JSON graph format and the binary graph cache      |
//! | [`osm`]         | `load_from_pbf` (feature = `"osm"` only)                   |
//! | [`error`]       | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod cost;
pub mod error;
pub mod io;
pub mod materialize;
pub mod network;
pub mod router;

#[cfg(feature = "osm")]
pub mod osm;


pub use cost::{CostModel, DistanceCost, ModeCost, SafeCost};
pub use error::{SpatialError, SpatialResult};
pub use io::{load_graph, load_graph_json, GraphData};
pub use materialize::materialize;
pub use network::{EdgeAttrs, EdgeRef, RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Path, Router};
