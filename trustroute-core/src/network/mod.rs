//! Network state: topology, per-node reliability, per-link congestion and
//! the hop-by-hop delivery oracle.

mod delivery;
mod snapshot;
mod state;
mod topology;

pub use delivery::{
    CongestionOnlyDelivery, DeliveryOutcome, DeliveryPolicy, DeliveryPolicyKind, DropCause,
    HopConditions, QosAwareDelivery, ReliabilityOnlyDelivery,
};
pub use snapshot::{
    LinkView, NetworkSnapshot, NodeView, RELIABILITY_FLAG_THRESHOLD, TRUST_FLAG_THRESHOLD,
};
pub use state::NetworkState;
pub use topology::{Link, Node, Topology};

use std::time::Duration;

use thiserror::Error;

/// Node identifier, unique within a simulation run.
pub type NodeId = u32;

/// Base reliability of a node nobody has configured.
pub const DEFAULT_RELIABILITY: f64 = 0.98;

/// Errors raised while building or mutating the network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Topology construction parameters are malformed
    #[error("Invalid topology: {reason}")]
    InvalidTopology { reason: String },

    #[error("Unknown node {node}")]
    UnknownNode { node: NodeId },

    #[error("No link from {from} to {to}")]
    UnknownLink { from: NodeId, to: NodeId },

    #[error("Invalid reliability {value} for node {node}: must be within [0, 1]")]
    InvalidReliability { node: NodeId, value: f64 },

    #[error("Invalid weight {weight} for link {from}-{to}: must be positive")]
    InvalidWeight { from: NodeId, to: NodeId, weight: f64 },

    #[error("Invalid congestion level {value}: must be within [0, 1]")]
    InvalidCongestion { value: f64 },

    #[error("Invalid on-off dwell for node {node}: {good_dwell:?}/{bad_dwell:?}, both must be non-zero")]
    InvalidDwell {
        node: NodeId,
        good_dwell: Duration,
        bad_dwell: Duration,
    },
}
