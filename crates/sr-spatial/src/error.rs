//! Spatial-subsystem error type.

use std::path::PathBuf;

use thiserror::Error;

use sr_core::{CoreError, NodeId};

/// Errors produced by `sr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("{0} not found in network")]
    NodeNotFound(NodeId),

    #[error("endpoint {0} is not a node of the network")]
    InvalidEndpoint(NodeId),

    #[error("network has no nodes")]
    EmptyGraph,

    #[error("no edge from {from} to {to}")]
    NoEdge { from: NodeId, to: NodeId },

    #[error("malformed graph data: {0}")]
    MalformedGraph(String),

    #[error(transparent)]
    InvalidCoordinate(#[from] CoreError),

    #[error("graph cache {path}: {message}")]
    Cache { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
