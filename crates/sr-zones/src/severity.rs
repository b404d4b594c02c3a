//! Category → penalty multiplier table.
//!
//! The reference dataset labels zones `"red"` and `"yellow"` and both carry a
//! multiplier of 4.  Whether that equality is intended is unknown, so the
//! mapping is data, not code: deployments override it through configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::zone::normalize_category;
use crate::{ZoneError, ZoneResult};

/// Multiplier applied when no zone covers a point.
pub const NO_PENALTY: f64 = 1.0;

/// Multiplier used by the reference dataset for every category.
pub const REFERENCE_MULTIPLIER: f64 = 4.0;

/// Severity multipliers keyed by lowercase category label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityTable {
    /// Explicit multipliers per category.  Keys read from configuration are
    /// normalised like zone labels.
    #[serde(deserialize_with = "normalized_keys")]
    pub multipliers: BTreeMap<String, f64>,
    /// Multiplier for categories absent from `multipliers`.
    pub default_multiplier: f64,
}

impl Default for SeverityTable {
    /// `red = 4`, `yellow = 4`, anything else `4`.
    fn default() -> Self {
        let mut multipliers = BTreeMap::new();
        multipliers.insert("red".to_owned(), REFERENCE_MULTIPLIER);
        multipliers.insert("yellow".to_owned(), REFERENCE_MULTIPLIER);
        Self { multipliers, default_multiplier: REFERENCE_MULTIPLIER }
    }
}

impl SeverityTable {
    /// A table where every category maps to `multiplier`.
    pub fn uniform(multiplier: f64) -> Self {
        Self { multipliers: BTreeMap::new(), default_multiplier: multiplier }
    }

    /// Builder-style override for one category.
    pub fn with(mut self, category: &str, multiplier: f64) -> Self {
        self.multipliers.insert(normalize_category(category), multiplier);
        self
    }

    /// Multiplier for `category` (case-insensitive).
    pub fn multiplier(&self, category: &str) -> f64 {
        self.multipliers
            .get(&normalize_category(category))
            .copied()
            .unwrap_or(self.default_multiplier)
    }

    /// Every multiplier must be finite and `>= 1`, otherwise safe-mode costs
    /// could drop below plain distance.
    pub fn validate(&self) -> ZoneResult<()> {
        let entries = self
            .multipliers
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .chain(std::iter::once(("<default>", self.default_multiplier)));
        for (category, multiplier) in entries {
            if !multiplier.is_finite() || multiplier < NO_PENALTY {
                return Err(ZoneError::InvalidSeverity {
                    category: category.to_owned(),
                    multiplier,
                });
            }
        }
        Ok(())
    }
}

fn normalized_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (normalize_category(&k), v)).collect())
}
