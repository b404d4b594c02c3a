//! Spatial index over risk zones.
//!
//! # Query
//!
//! `penalty_at` first asks an R-tree (via `rstar`) for zones whose bounding
//! box contains the point, then applies the exact circle test to each
//! candidate.  The answer is identical to a linear scan over every zone; the
//! tree only keeps the per-edge cost sub-linear in zone count.

use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use sr_core::GeoPoint;

use crate::severity::NO_PENALTY;
use crate::{RiskZone, SeverityTable, ZoneResult};

// ── R-tree zone entry ─────────────────────────────────────────────────────────

/// Bounding box of one zone in `[lat, lon]` space plus its position in the
/// load-ordered zone list.
struct ZoneEntry {
    bounds: AABB<[f64; 2]>,
    slot:   usize,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

// ── ZoneIndex ─────────────────────────────────────────────────────────────────

/// Loaded risk zones and their severity multipliers.
///
/// Built once at startup and read-only afterwards, so a shared reference can
/// serve any number of concurrent queries.
pub struct ZoneIndex {
    zones:       Vec<RiskZone>,
    /// Multiplier per zone, resolved from the severity table at build time.
    multipliers: Vec<f64>,
    severity:    SeverityTable,
    tree:        RTree<ZoneEntry>,
}

impl ZoneIndex {
    /// Index `zones` using `severity` for their multipliers.
    ///
    /// Fails if the severity table contains a multiplier below 1.
    pub fn new(zones: Vec<RiskZone>, severity: SeverityTable) -> ZoneResult<Self> {
        severity.validate()?;

        let multipliers: Vec<f64> = zones
            .iter()
            .map(|z| severity.multiplier(z.severity_key()))
            .collect();

        let entries: Vec<ZoneEntry> = zones
            .iter()
            .enumerate()
            .map(|(slot, z)| {
                let (lo, hi) = z.bounds();
                ZoneEntry { bounds: AABB::from_corners(lo, hi), slot }
            })
            .collect();
        let tree = RTree::bulk_load(entries);

        info!(zones = zones.len(), "built risk-zone index");

        Ok(Self { zones, multipliers, severity, tree })
    }

    /// An index with no zones; every point has penalty 1.
    pub fn empty() -> Self {
        Self {
            zones:       Vec::new(),
            multipliers: Vec::new(),
            severity:    SeverityTable::default(),
            tree:        RTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// All zones in load order.
    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    pub fn severity(&self) -> &SeverityTable {
        &self.severity
    }

    /// Multiplier of the zone at load position `slot`.
    pub fn multiplier_of(&self, slot: usize) -> Option<f64> {
        self.multipliers.get(slot).copied()
    }

    /// Penalty multiplier at `point`.
    ///
    /// The maximum multiplier among zones containing the point, or exactly
    /// `1.0` if none do.
    pub fn penalty_at(&self, point: GeoPoint) -> f64 {
        self.candidates(point)
            .filter(|&slot| self.zones[slot].contains(point))
            .map(|slot| self.multipliers[slot])
            .fold(NO_PENALTY, f64::max)
    }

    /// Zones containing `point`, in load order.
    pub fn zones_containing(&self, point: GeoPoint) -> Vec<&RiskZone> {
        let mut slots: Vec<usize> = self
            .candidates(point)
            .filter(|&slot| self.zones[slot].contains(point))
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|slot| &self.zones[slot]).collect()
    }

    fn candidates(&self, point: GeoPoint) -> impl Iterator<Item = usize> + '_ {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.lat, point.lon]))
            .map(|e| e.slot)
    }
}

impl Default for ZoneIndex {
    fn default() -> Self {
        Self::empty()
    }
}
