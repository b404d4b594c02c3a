//! Routing requests.
//!
//! [`RouteRequest`] is the wire shape: `[lat, lon]` pairs and a mode string,
//! exactly as a client sends them.  [`RouteRequest::validate`] turns it into a
//! typed [`RouteQuery`], which is all the engine ever sees.

use serde::{Deserialize, Serialize};

use sr_core::{GeoPoint, RoutingMode};

use crate::{RouteError, RouteResult};

/// A validated routing query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteQuery {
    pub start: GeoPoint,
    pub end:   GeoPoint,
    pub mode:  RoutingMode,
}

impl RouteQuery {
    pub fn new(start: GeoPoint, end: GeoPoint, mode: RoutingMode) -> Self {
        Self { start, end, mode }
    }
}

/// An unvalidated routing request.
///
/// ```json
/// { "start": [40.71, -74.00], "end": [40.73, -73.99], "mode": "safe" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// `[lat, lon]`
    pub start: [f64; 2],
    /// `[lat, lon]`
    pub end:   [f64; 2],
    #[serde(default)]
    pub mode:  Option<String>,
}

impl RouteRequest {
    pub fn new(start: [f64; 2], end: [f64; 2], mode: &str) -> Self {
        Self { start, end, mode: Some(mode.to_owned()) }
    }

    /// Parse a JSON request body.  Any syntax or shape error is
    /// `MalformedInput`.
    pub fn from_json(body: &str) -> RouteResult<Self> {
        serde_json::from_str(body).map_err(|e| RouteError::malformed(format!("invalid request: {e}")))
    }

    /// Check coordinates and mode.
    ///
    /// Coordinates must be finite with `lat` in `[-90, 90]` and `lon` in
    /// `[-180, 180]`; the mode must be present and name a known
    /// [`RoutingMode`] (case-insensitive).
    pub fn validate(&self) -> RouteResult<RouteQuery> {
        let start = GeoPoint::checked(self.start[0], self.start[1])?;
        let end = GeoPoint::checked(self.end[0], self.end[1])?;
        let mode = self
            .mode
            .as_deref()
            .ok_or_else(|| RouteError::malformed("missing routing mode"))?
            .parse::<RoutingMode>()?;
        Ok(RouteQuery { start, end, mode })
    }
}

impl From<RouteQuery> for RouteRequest {
    fn from(q: RouteQuery) -> Self {
        Self {
            start: [q.start.lat, q.start.lon],
            end:   [q.end.lat, q.end.lon],
            mode:  Some(q.mode.as_str().to_owned()),
        }
    }
}
