//! Zone dataset loaders.
//!
//! # CSV format
//!
//! One row per zone.  `total_incidents` may be empty.
//!
//! ```csv
//! lat,lon,radius,zone,total_incidents
//! 40.7580,-73.9855,250,red,41
//! 40.7484,-73.9857,120,yellow,
//! ```
//!
//! # JSON format
//!
//! An array of the same records:
//!
//! ```json
//! [{ "lat": 40.758, "lon": -73.9855, "radius": 250, "zone": "red", "total_incidents": 41 }]
//! ```
//!
//! Only `lat`, `lon`, `radius` and `zone` influence routing;
//! `total_incidents` is carried through for zone listings.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use sr_core::GeoPoint;

use crate::{RiskZone, ZoneError, ZoneResult};

// ── Record ────────────────────────────────────────────────────────────────────

/// One zone as it appears in the source dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub lat:    f64,
    pub lon:    f64,
    /// Radius in metres.
    pub radius: f64,
    /// Category label, e.g. `"red"`.
    pub zone:   String,
    #[serde(default)]
    pub total_incidents: Option<u32>,
}

impl ZoneRecord {
    /// Validate and convert into a [`RiskZone`].
    pub fn into_zone(self) -> ZoneResult<RiskZone> {
        let zone = RiskZone::new(GeoPoint::new(self.lat, self.lon), self.radius, &self.zone)?;
        Ok(match self.total_incidents {
            Some(n) => zone.with_incidents(n),
            None => zone,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load zones from a file, choosing JSON for a `.json` extension and CSV
/// otherwise.
pub fn load_zones_path(path: &Path) -> ZoneResult<Vec<RiskZone>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let zones = if is_json { load_zones_json(path)? } else { load_zones_csv(path)? };
    info!(path = %path.display(), zones = zones.len(), "loaded risk zones");
    Ok(zones)
}

/// Load zones from a CSV file.
pub fn load_zones_csv(path: &Path) -> ZoneResult<Vec<RiskZone>> {
    let file = std::fs::File::open(path)?;
    load_zones_reader(file)
}

/// Like [`load_zones_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for embedded datasets.
pub fn load_zones_reader<R: Read>(reader: R) -> ZoneResult<Vec<RiskZone>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    csv_reader
        .deserialize::<ZoneRecord>()
        .enumerate()
        .map(|(row, result)| {
            let record = result.map_err(|e| ZoneError::Parse(format!("row {}: {e}", row + 1)))?;
            record.into_zone()
        })
        .collect()
}

/// Load zones from a JSON array file.
pub fn load_zones_json(path: &Path) -> ZoneResult<Vec<RiskZone>> {
    let file = std::fs::File::open(path)?;
    let records: Vec<ZoneRecord> = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| ZoneError::Parse(e.to_string()))?;
    records.into_iter().map(ZoneRecord::into_zone).collect()
}
