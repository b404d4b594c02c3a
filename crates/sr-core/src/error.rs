//! Shared error type for input parsing and validation.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so a malformed coordinate or mode string surfaces
//! the same way no matter which layer parsed it.

use thiserror::Error;

/// Errors produced while parsing or validating core values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown routing mode {0:?}: expected \"fast\" or \"safe\"")]
    UnknownMode(String),

    #[error("invalid coordinate ({lat}, {lon}): {reason}")]
    InvalidCoordinate { lat: f64, lon: f64, reason: &'static str },

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `sr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
