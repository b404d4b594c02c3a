//! Engine configuration.
//!
//! Loaded from a JSON file, then overridden by environment variables, then
//! (in the CLI) by command-line flags.
//!
//! ```json
//! {
//!   "graph_path": "data/graph.json",
//!   "graph_cache_path": "data/graph.srgc",
//!   "zones_path": "data/zones.csv",
//!   "severity": { "multipliers": { "red": 4.0, "yellow": 2.0 }, "default_multiplier": 4.0 },
//!   "logging": { "format": "text", "level": "info" }
//! }
//! ```
//!
//! # Environment variables
//!
//! | Variable                | Overrides          |
//! |-------------------------|--------------------|
//! | `SAFEROUTE_GRAPH`       | `graph_path`       |
//! | `SAFEROUTE_GRAPH_CACHE` | `graph_cache_path` |
//! | `SAFEROUTE_ZONES`       | `zones_path`       |
//! | `LOG_FORMAT`            | `logging.format`   |
//! | `RUST_LOG`              | `logging.level`    |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sr_zones::SeverityTable;

use crate::{EngineError, EngineResult};

pub const ENV_GRAPH: &str = "SAFEROUTE_GRAPH";
pub const ENV_GRAPH_CACHE: &str = "SAFEROUTE_GRAPH_CACHE";
pub const ENV_ZONES: &str = "SAFEROUTE_ZONES";

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `"json"` (any case) is JSON; everything else is text.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Logging settings.  Consumed by the binary; libraries only emit events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `"info"` or `"sr_spatial=debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: LogFormat::Text, level: "info".to_string() }
    }
}

impl LoggingConfig {
    /// Defaults overridden by `LOG_FORMAT` and `RUST_LOG`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|k| std::env::var(k).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(format) = var("LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
        if let Some(level) = var("RUST_LOG").filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        self
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Road network source: portable JSON, or `.osm.pbf` with the `osm`
    /// feature.
    pub graph_path: Option<PathBuf>,
    /// Binary cache for a JSON `graph_path`.
    pub graph_cache_path: Option<PathBuf>,
    /// Zone dataset (CSV, or JSON by extension).  No zones if unset.
    pub zones_path: Option<PathBuf>,
    pub severity: SeverityTable,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Read a JSON config file.  Missing keys take their defaults.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply `SAFEROUTE_*`, `LOG_FORMAT` and `RUST_LOG` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let path = |k: &str| var(k).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        if let Some(p) = path(ENV_GRAPH) {
            self.graph_path = Some(p);
        }
        if let Some(p) = path(ENV_GRAPH_CACHE) {
            self.graph_cache_path = Some(p);
        }
        if let Some(p) = path(ENV_ZONES) {
            self.zones_path = Some(p);
        }
        self.logging = self.logging.with_overrides(&var);
        self
    }

    /// A graph source must be set and the severity table must be valid.
    pub fn validate(&self) -> EngineResult<()> {
        if self.graph_path.is_none() {
            return Err(EngineError::Config(format!(
                "no road network configured (set graph_path or {ENV_GRAPH})"
            )));
        }
        self.severity.validate()?;
        Ok(())
    }
}
