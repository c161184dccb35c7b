//! Per-hop loss policies and delivery outcomes.

use std::fmt;

use serde::Serialize;

use super::NodeId;
use crate::config::DeliveryConfig;
use crate::traffic::TrafficClass;

/// Conditions a packet meets when entering a node.
#[derive(Debug, Clone, Copy)]
pub struct HopConditions {
    pub node: NodeId,
    pub reliability: f64,
    /// Congestion of the link the packet arrived on
    pub congestion: f64,
    pub class: TrafficClass,
}

/// Loss semantics of the delivery oracle.
///
/// Chosen when the network state is built; the oracle asks it for the
/// probability that a non-adversarial hop forwards the packet.
pub trait DeliveryPolicy: fmt::Debug + Send + Sync {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// Probability in [0, 1] that the hop forwards the packet.
    fn forward_probability(&self, hop: &HopConditions) -> f64;
}

/// Selectable delivery policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryPolicyKind {
    /// Reliability combined with class-weighted congestion loss
    QosAware,
    /// Ground-truth reliability only
    ReliabilityOnly,
    /// Class-weighted congestion loss only
    CongestionOnly,
}

impl DeliveryPolicyKind {
    /// Builds the policy described by `config`.
    pub fn build(self, config: &DeliveryConfig) -> Box<dyn DeliveryPolicy> {
        match self {
            DeliveryPolicyKind::QosAware => Box::new(QosAwareDelivery::new(config)),
            DeliveryPolicyKind::ReliabilityOnly => Box::new(ReliabilityOnlyDelivery),
            DeliveryPolicyKind::CongestionOnly => Box::new(CongestionOnlyDelivery {
                congestion: QosAwareDelivery::new(config),
            }),
        }
    }
}

/// Reliability scaled by congestion loss weighted per traffic class.
///
/// At full congestion a class with sensitivity `s` loses
/// `s * max_congestion_loss` of its forward probability.
#[derive(Debug, Clone)]
pub struct QosAwareDelivery {
    config: DeliveryConfig,
}

impl QosAwareDelivery {
    pub fn new(config: &DeliveryConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn congestion_factor(&self, hop: &HopConditions) -> f64 {
        let sensitivity = self.config.sensitivity(hop.class).clamp(0.0, 1.0);
        let max_loss = self.config.max_congestion_loss.clamp(0.0, 1.0);
        1.0 - hop.congestion.clamp(0.0, 1.0) * sensitivity * max_loss
    }
}

impl DeliveryPolicy for QosAwareDelivery {
    fn name(&self) -> &'static str {
        "qos-aware"
    }

    fn forward_probability(&self, hop: &HopConditions) -> f64 {
        hop.reliability * self.congestion_factor(hop)
    }
}

/// Forwards with the node's base reliability, ignoring congestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReliabilityOnlyDelivery;

impl DeliveryPolicy for ReliabilityOnlyDelivery {
    fn name(&self) -> &'static str {
        "reliability-only"
    }

    fn forward_probability(&self, hop: &HopConditions) -> f64 {
        hop.reliability
    }
}

/// Loses packets to congestion only; every node is otherwise perfect.
#[derive(Debug, Clone)]
pub struct CongestionOnlyDelivery {
    congestion: QosAwareDelivery,
}

impl DeliveryPolicy for CongestionOnlyDelivery {
    fn name(&self) -> &'static str {
        "congestion-only"
    }

    fn forward_probability(&self, hop: &HopConditions) -> f64 {
        self.congestion.congestion_factor(hop)
    }
}

/// Why a hop failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropCause {
    /// A malicious node refused to forward
    Adversary,
    /// Reliability or congestion loss
    Loss,
    /// Consecutive path nodes are not adjacent
    MissingLink,
    /// The path starts at a node outside the topology
    UnknownNode,
}

impl DropCause {
    pub fn as_str(self) -> &'static str {
        match self {
            DropCause::Adversary => "adversary",
            DropCause::Loss => "loss",
            DropCause::MissingLink => "missing-link",
            DropCause::UnknownNode => "unknown-node",
        }
    }
}

/// Result of walking a path through the delivery oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DeliveryOutcome {
    /// Every hop forwarded the packet
    Delivered { hops: usize },
    /// The packet was lost entering `node`
    Dropped { node: NodeId, cause: DropCause },
    /// No path was supplied
    EmptyPath,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}
