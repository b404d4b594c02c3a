//! Successful routing output.

use serde::Serialize;
use serde_json::{json, Value};

use sr_core::{GeoPoint, RoutingMode};
use sr_zones::RiskZone;

/// A computed route.
///
/// `coordinates` run from the resolved start node to the resolved end node.
/// `distance_m` is the physical length; `cost` is the total under the mode's
/// cost model, so in safe mode it includes zone penalties.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    coordinates: Vec<GeoPoint>,
    mode:        RoutingMode,
    distance_m:  f64,
    cost:        f64,
}

impl Route {
    pub(crate) fn new(coordinates: Vec<GeoPoint>, mode: RoutingMode, distance_m: f64, cost: f64) -> Self {
        Self { coordinates, mode, distance_m, cost }
    }

    pub fn coordinates(&self) -> &[GeoPoint] { &self.coordinates }
    pub fn mode(&self) -> RoutingMode { self.mode }
    pub fn distance_m(&self) -> f64 { self.distance_m }
    pub fn cost(&self) -> f64 { self.cost }

    /// GeoJSON `Feature` with a `LineString` geometry (`[lon, lat]` pairs).
    pub fn to_geojson(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self.coordinates.iter().map(|p| p.to_lon_lat()).collect();
        json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
            "properties": {
                "mode": self.mode.as_str(),
                "distance_m": self.distance_m,
                "cost": self.cost,
            },
        })
    }
}

/// One entry of the zone listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneListing {
    pub lat:    f64,
    pub lon:    f64,
    pub zone:   String,
    /// Metres.
    pub radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_incidents: Option<u32>,
}

impl From<&RiskZone> for ZoneListing {
    fn from(z: &RiskZone) -> Self {
        Self {
            lat:             z.center().lat,
            lon:             z.center().lon,
            zone:            z.category().to_owned(),
            radius:          z.radius_m(),
            total_incidents: z.total_incidents(),
        }
    }
}
