//! Trustroute Core - network, trust and routing models
//!
//! This crate provides the building blocks of the packet routing
//! simulator: the mutable network state with its delivery oracle, the
//! reputation model, malicious node behavior, the Q-routing agent and the
//! path selection strategies that consume them.

pub mod adversary;
pub mod agent;
pub mod config;
pub mod network;
pub mod rng;
pub mod routing;
pub mod tracing_setup;
pub mod traffic;
pub mod trust;

// Re-export main types for convenient access
pub use adversary::{Adversary, AttackKind, BehaviorState, Verdict};
pub use agent::{AgentError, QRoutingAgent};
pub use config::TrustrouteConfig;
pub use network::{
    DeliveryOutcome, DeliveryPolicy, DeliveryPolicyKind, DropCause, NetworkError, NetworkState,
    NodeId, Topology,
};
pub use rng::DeterministicRng;
pub use routing::{RoutingAlgorithm, RoutingContext, RoutingStrategy};
pub use traffic::{Flow, TrafficClass};
pub use trust::{TrustError, TrustModel};

/// Errors that can bubble up from any Trustroute core subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TrustrouteError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Trust error: {0}")]
    Trust(#[from] TrustError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrustrouteError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            TrustrouteError::Network(NetworkError::InvalidTopology { reason }) => {
                format!("Cannot build topology: {reason}")
            }
            TrustrouteError::Network(NetworkError::UnknownNode { node }) => {
                format!("Node {node} does not exist in this topology")
            }
            TrustrouteError::Network(_) => "Invalid network setup".to_string(),
            TrustrouteError::Trust(TrustError::InvalidConfig { reason }) => {
                format!("Invalid trust settings: {reason}")
            }
            TrustrouteError::Agent(e) => format!("Invalid agent settings: {e}"),
            TrustrouteError::Configuration { reason } => format!("Configuration error: {reason}"),
            TrustrouteError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, TrustrouteError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, TrustrouteError>;
