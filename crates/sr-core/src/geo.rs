//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Node coordinates are compared
//! exactly (a query placed on a node must resolve to that node) and emitted
//! verbatim in route geometries, so no precision is traded away here.

use crate::{CoreError, CoreResult};

/// Metres per degree used to turn a zone radius into a degree radius.
///
/// A planar approximation: valid at metropolitan scale, not across large
/// latitude spans.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Construct a point, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lon: f64) -> CoreResult<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoreError::InvalidCoordinate { lat, lon, reason: "not a finite number" });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::InvalidCoordinate { lat, lon, reason: "latitude out of range" });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoreError::InvalidCoordinate { lat, lon, reason: "longitude out of range" });
        }
        Ok(Self { lat, lon })
    }

    /// Arithmetic mean of two coordinates.
    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        GeoPoint::new((self.lat + other.lat) * 0.5, (self.lon + other.lon) * 0.5)
    }

    /// Squared Euclidean distance in degree space.  Used for nearest-node
    /// ordering where only relative distance matters.
    #[inline]
    pub fn planar_distance2_deg(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }

    /// Euclidean distance in degree space.
    #[inline]
    pub fn planar_distance_deg(self, other: GeoPoint) -> f64 {
        self.planar_distance2_deg(other).sqrt()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// `[lon, lat]` pair in GeoJSON axis order.
    #[inline]
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Inverse of [`to_lon_lat`](Self::to_lon_lat).
    #[inline]
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[1], pair[0])
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
