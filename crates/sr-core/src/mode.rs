//! Routing mode selected per request.
//!
//! The mode is a closed set: each variant maps to exactly one cost model in
//! `sr-spatial::cost`.  Strings only appear at the edges (request parsing,
//! output labels).

use std::str::FromStr;

use crate::CoreError;

/// Which edge-cost function a routing request uses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoutingMode {
    /// Shortest physical distance.
    #[default]
    Fast,
    /// Distance scaled by the risk-zone penalty at each edge.
    Safe,
}

impl RoutingMode {
    /// Every variant, in declaration order.
    pub const ALL: [RoutingMode; 2] = [RoutingMode::Fast, RoutingMode::Safe];

    /// Wire label, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingMode::Fast => "fast",
            RoutingMode::Safe => "safe",
        }
    }

    /// `true` if this mode consults the risk-zone index.
    #[inline]
    pub fn uses_zones(self) -> bool {
        matches!(self, RoutingMode::Safe)
    }
}

impl FromStr for RoutingMode {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(RoutingMode::Fast),
            "safe" => Ok(RoutingMode::Safe),
            _ => Err(CoreError::UnknownMode(s.to_owned())),
        }
    }
}

impl std::fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
