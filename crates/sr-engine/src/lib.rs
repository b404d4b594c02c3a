//! `sr-engine`: the request-facing layer of saferoute.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`engine`] | `RoutingEngine`: `route`, `route_batch`, `zones_listing`  |
//! | [`query`]  | `RouteRequest` (wire) → `RouteQuery` (validated)          |
//! | [`route`]  | `Route` with GeoJSON output, `ZoneListing`                |
//! | [`config`] | `EngineConfig`, `LoggingConfig`                           |
//! | [`error`]  | `RouteError` / `ErrorKind`, `EngineError`                 |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                              |
//! |------------|-----------------------------------------------------|
//! | `parallel` | `route_batch` runs on the rayon thread pool.        |
//! | `osm`      | `.pbf` graph sources are loaded with `osmpbf`.      |

pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod route;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, LogFormat, LoggingConfig};
pub use engine::RoutingEngine;
pub use error::{EngineError, EngineResult, ErrorKind, RouteError, RouteResult};
pub use query::{RouteQuery, RouteRequest};
pub use route::{Route, ZoneListing};

pub use sr_core::{GeoPoint, RoutingMode};
