//! Engine error types.
//!
//! Two layers:
//!
//! - [`RouteError`] is the per-request failure returned to callers.  It is a
//!   plain `{ kind, message }` value so it can be serialized as-is.
//! - [`EngineError`] covers start-up: configuration and data loading.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sr_core::CoreError;
use sr_spatial::SpatialError;
use sr_zones::ZoneError;

// ── RouteError ────────────────────────────────────────────────────────────────

/// Category of a failed routing request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Both endpoints resolved, but no directed path connects them.
    NoPathFound,
    /// An endpoint does not exist in the network.
    InvalidEndpoint,
    /// The network has no nodes, so no coordinate can be resolved.
    EmptyGraph,
    /// The request or the loaded data is not well-formed.
    MalformedInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NoPathFound     => "NoPathFound",
            ErrorKind::InvalidEndpoint => "InvalidEndpoint",
            ErrorKind::EmptyGraph      => "EmptyGraph",
            ErrorKind::MalformedInput  => "MalformedInput",
        };
        f.write_str(s)
    }
}

/// A failed routing request.  Never accompanied by a partial route.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct RouteError {
    pub kind:    ErrorKind,
    pub message: String,
}

impl RouteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
    }
}

impl From<SpatialError> for RouteError {
    fn from(e: SpatialError) -> Self {
        let kind = match &e {
            SpatialError::NoPath { .. } => ErrorKind::NoPathFound,
            SpatialError::InvalidEndpoint(_) | SpatialError::NodeNotFound(_) => ErrorKind::InvalidEndpoint,
            SpatialError::EmptyGraph => ErrorKind::EmptyGraph,
            _ => ErrorKind::MalformedInput,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<CoreError> for RouteError {
    fn from(e: CoreError) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<ZoneError> for RouteError {
    fn from(e: ZoneError) -> Self {
        Self::malformed(e.to_string())
    }
}

pub type RouteResult<T> = Result<T, RouteError>;

// ── EngineError ───────────────────────────────────────────────────────────────

/// Errors raised while configuring or loading an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to load road network: {0}")]
    Graph(#[from] SpatialError),

    #[error("failed to load risk zones: {0}")]
    Zones(#[from] ZoneError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
