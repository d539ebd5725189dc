use thiserror::Error;

use crate::model::graph::NodeId;

/// Failures reported by the graph model, the path algorithms and the
/// routing table builder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge not found: {from} -> {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("negative weight {weight} on edge {from} -> {to}")]
    NegativeWeight { from: NodeId, to: NodeId, weight: f64 },

    #[error("negative-weight cycle reachable from {origin}")]
    NegativeCycleDetected { origin: NodeId },

    #[error("source and destination are the same node: {0}")]
    SameEndpoints(NodeId),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
