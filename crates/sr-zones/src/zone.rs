//! A single circular risk zone.

use sr_core::{GeoPoint, METERS_PER_DEGREE};

use crate::{ZoneError, ZoneResult};

/// A circular region flagged with a severity category.
///
/// The degree-space radius is derived once in [`RiskZone::new`] and the zone
/// is immutable afterwards; fields are read through accessors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiskZone {
    center:          GeoPoint,
    radius_m:        f64,
    radius_deg:      f64,
    category:        String,
    #[cfg_attr(feature = "serde", serde(skip))]
    severity_key:    String,
    total_incidents: Option<u32>,
}

impl RiskZone {
    /// Build a zone, validating the center and radius.
    ///
    /// The category label is kept as given.  Severity lookup uses its trimmed
    /// lowercase form, so `"Red"` and `"red"` share a severity entry.
    pub fn new(center: GeoPoint, radius_m: f64, category: &str) -> ZoneResult<Self> {
        let center = GeoPoint::checked(center.lat, center.lon)?;
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(ZoneError::InvalidRadius(radius_m));
        }
        Ok(Self {
            center,
            radius_m,
            radius_deg: radius_m / METERS_PER_DEGREE,
            category: category.to_owned(),
            severity_key: normalize_category(category),
            total_incidents: None,
        })
    }

    /// Attach the incident count carried by the source dataset.  Not used
    /// for penalties; passed through to zone listings.
    pub fn with_incidents(mut self, total_incidents: u32) -> Self {
        self.total_incidents = Some(total_incidents);
        self
    }

    pub fn center(&self) -> GeoPoint { self.center }
    pub fn radius_m(&self) -> f64 { self.radius_m }
    pub fn radius_deg(&self) -> f64 { self.radius_deg }
    pub fn category(&self) -> &str { &self.category }
    /// Normalised category used for severity lookup.
    pub fn severity_key(&self) -> &str { &self.severity_key }
    pub fn total_incidents(&self) -> Option<u32> { self.total_incidents }

    /// Planar point-in-circle test in degree space.  The boundary counts as
    /// inside.
    #[inline]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.center.planar_distance2_deg(point) <= self.radius_deg * self.radius_deg
    }

    /// Axis-aligned bounds of the circle as `([lat_min, lon_min], [lat_max, lon_max])`.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let r = self.radius_deg;
        (
            [self.center.lat - r, self.center.lon - r],
            [self.center.lat + r, self.center.lon + r],
        )
    }
}

pub(crate) fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}
