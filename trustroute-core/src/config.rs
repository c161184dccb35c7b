//! Centralized configuration for Trustroute.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use crate::network::{DeliveryPolicyKind, NodeId};
use crate::traffic::TrafficClass;

/// Central configuration for all Trustroute components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct TrustrouteConfig {
    pub topology: TopologyConfig,
    pub delivery: DeliveryConfig,
    pub congestion: CongestionConfig,
    pub trust: TrustConfig,
    pub agent: AgentConfig,
    pub traffic: TrafficConfig,
    pub simulation: SimulationConfig,
}

/// Random topology generation parameters.
#[derive(Debug, Clone)]
pub struct TopologyConfig {
    /// Number of nodes in the generated graph
    pub num_nodes: usize,
    /// Probability that any unordered node pair is linked
    pub density: f64,
    /// Seed for topology, delivery and agent randomness
    pub seed: u64,
    /// Lower bound of the link latency weight range (inclusive)
    pub min_weight: f64,
    /// Upper bound of the link latency weight range (exclusive)
    pub max_weight: f64,
    /// Base reliability assigned to every generated node
    pub default_reliability: f64,
    /// Give isolated nodes one random link after sampling
    pub connect_isolated: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            num_nodes: 15,
            density: 0.2,
            seed: 42,
            min_weight: 1.0,
            max_weight: 10.0,
            default_reliability: 0.98,
            connect_isolated: true,
        }
    }
}

/// Delivery oracle loss semantics.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Which loss policy the oracle is built with
    pub policy: DeliveryPolicyKind,
    /// Forward probability lost at full congestion for a fully sensitive class
    pub max_congestion_loss: f64,
    /// Congestion sensitivity of low-priority data traffic
    pub data_sensitivity: f64,
    /// Congestion sensitivity of high-priority voice traffic
    pub voice_sensitivity: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            policy: DeliveryPolicyKind::QosAware,
            max_congestion_loss: 0.5,
            data_sensitivity: 1.0,
            voice_sensitivity: 0.2,
        }
    }
}

impl DeliveryConfig {
    /// Returns the congestion sensitivity configured for a traffic class.
    pub fn sensitivity(&self, class: TrafficClass) -> f64 {
        match class {
            TrafficClass::Data => self.data_sensitivity,
            TrafficClass::Voice => self.voice_sensitivity,
        }
    }
}

/// Congestion evolution process parameters.
#[derive(Debug, Clone)]
pub struct CongestionConfig {
    /// Simulated time between congestion updates
    pub tick: Duration,
    /// Congestion level links start at and revert toward
    pub baseline: f64,
    /// Maximum random step per tick
    pub volatility: f64,
    /// Fraction of the distance to baseline recovered per tick
    pub mean_reversion: f64,
    /// Per-link probability of a load burst each tick
    pub burst_probability: f64,
    /// Minimum congestion level reached during a burst
    pub burst_floor: f64,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            baseline: 0.2,
            volatility: 0.15,
            mean_reversion: 0.1,
            burst_probability: 0.05,
            burst_floor: 0.7,
        }
    }
}

/// Reputation update parameters.
#[derive(Debug, Clone)]
pub struct TrustConfig {
    /// Score assumed for nodes never observed
    pub initial_trust: f64,
    /// Multiplicative penalty applied on failure
    pub decay_factor: f64,
    /// Additive bonus applied on success
    pub bonus_factor: f64,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            initial_trust: 1.0,
            decay_factor: 0.95,
            bonus_factor: 0.05,
        }
    }
}

/// Q-learning hyperparameters.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Learning rate
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Exploration rate
    pub epsilon: f64,
    /// Hop budget for hop-by-hop path construction (None = 2 x node count)
    pub max_hops: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
            max_hops: None,
        }
    }
}

/// How the traffic generator picks (source, destination) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowSelection {
    /// Independent uniform pair per packet
    RandomPairs,
    /// Uniform choice among `count` flows sampled once at start
    FixedFlows { count: usize },
    /// Every packet uses the same pair
    Pinned { source: NodeId, destination: NodeId },
}

/// Traffic generation parameters.
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Packets generated before the traffic process finishes
    pub packet_count: u64,
    /// Fraction of packets sent as voice; the rest are data
    pub voice_fraction: f64,
    /// Minimum simulated gap between packets
    pub min_gap: Duration,
    /// Maximum simulated gap between packets
    pub max_gap: Duration,
    /// Pair selection strategy
    pub flows: FlowSelection,
    /// Skip packets whose source or destination is an adversary
    pub exclude_adversary_endpoints: bool,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            packet_count: 50,
            voice_fraction: 0.5,
            min_gap: Duration::from_millis(100),
            max_gap: Duration::from_millis(500),
            flows: FlowSelection::FixedFlows { count: 10 },
            exclude_adversary_endpoints: false,
        }
    }
}

/// Orchestrator limits.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Simulated time after which a run stops regardless of pending work
    pub max_time: Duration,
    /// Maximum number of scheduled wakes held at once
    pub event_queue_capacity: usize,
    /// Maximum number of per-packet trace records kept
    pub trace_history: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_time: Duration::from_secs(100_000),
            event_queue_capacity: 100_000,
            trace_history: 10_000,
        }
    }
}

impl TrustrouteConfig {
    /// Creates a configuration for deterministic testing.
    ///
    /// Small topology, no congestion bursts, perfectly reliable nodes.
    pub fn deterministic_testing() -> Self {
        Self {
            topology: TopologyConfig {
                num_nodes: 10,
                density: 0.3,
                seed: 42,
                default_reliability: 1.0,
                ..Default::default()
            },
            congestion: CongestionConfig {
                baseline: 0.0,
                volatility: 0.0,
                burst_probability: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(seed) = std::env::var("TRUSTROUTE_SEED") {
            if let Ok(seed_value) = seed.parse::<u64>() {
                config.topology.seed = seed_value;
            }
        }

        if let Ok(nodes) = std::env::var("TRUSTROUTE_NODES") {
            if let Ok(count) = nodes.parse::<usize>() {
                config.topology.num_nodes = count;
            }
        }

        if let Ok(density) = std::env::var("TRUSTROUTE_DENSITY") {
            if let Ok(value) = density.parse::<f64>() {
                config.topology.density = value;
            }
        }

        if let Ok(packets) = std::env::var("TRUSTROUTE_PACKETS") {
            if let Ok(count) = packets.parse::<u64>() {
                config.traffic.packet_count = count;
            }
        }

        if let Ok(epsilon) = std::env::var("TRUSTROUTE_EPSILON") {
            if let Ok(value) = epsilon.parse::<f64>() {
                config.agent.epsilon = value;
            }
        }

        config
    }
}
