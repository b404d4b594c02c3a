//! `sr-core`: foundational types for the `saferoute` routing engine.
//!
//! This crate is a dependency of every other `sr-*` crate.  It intentionally
//! has no `sr-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`                                    |
//! | [`geo`]    | `GeoPoint`, haversine and planar distances            |
//! | [`mode`]   | `RoutingMode` enum (`fast` / `safe`)                  |
//! | [`error`]  | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, METERS_PER_DEGREE};
pub use ids::{EdgeId, NodeId};
pub use mode::RoutingMode;
