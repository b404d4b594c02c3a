//! Zone-subsystem error type.

use thiserror::Error;

use sr_core::CoreError;

/// Errors produced by `sr-zones`.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("invalid zone radius {0} m: must be finite and > 0")]
    InvalidRadius(f64),

    #[error("invalid zone center: {0}")]
    InvalidCenter(#[from] CoreError),

    #[error("invalid severity multiplier {multiplier} for {category:?}: must be finite and >= 1")]
    InvalidSeverity { category: String, multiplier: f64 },

    #[error("zone dataset parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ZoneResult<T> = Result<T, ZoneError>;
