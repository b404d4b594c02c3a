//! `sr-zones`: risk zones and the point-in-zone penalty query.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`zone`]     | `RiskZone` (center, radius, category, derived geometry)   |
//! | [`severity`] | `SeverityTable`: category → penalty multiplier            |
//! | [`index`]    | `ZoneIndex` (R-tree over zone bounds), `penalty_at`       |
//! | [`loader`]   | CSV / JSON zone dataset loaders                           |
//! | [`error`]    | `ZoneError`, `ZoneResult<T>`                              |
//!
//! # Geometry
//!
//! Zones are circles in degree space: a radius of `r` metres becomes
//! `r / 111_320` degrees around the center.  This is a planar approximation
//! that holds at the scale of one metropolitan area.

pub mod error;
pub mod index;
pub mod loader;
pub mod severity;
pub mod zone;


pub use error::{ZoneError, ZoneResult};
pub use index::ZoneIndex;
pub use loader::{load_zones_csv, load_zones_json, load_zones_path, load_zones_reader, ZoneRecord};
pub use severity::SeverityTable;
pub use zone::RiskZone;
