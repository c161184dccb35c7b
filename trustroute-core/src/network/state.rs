//! Mutable network state and the delivery oracle.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::delivery::{DeliveryOutcome, DeliveryPolicy, DropCause, HopConditions};
use super::snapshot::{LinkView, NetworkSnapshot, NodeView};
use super::topology::{Link, Topology};
use super::{NetworkError, NodeId};
use crate::adversary::{Adversary, AttackKind, Verdict};
use crate::config::{CongestionConfig, DeliveryConfig, TopologyConfig, TrustrouteConfig};
use crate::rng::DeterministicRng;
use crate::traffic::TrafficClass;
use crate::trust::TrustModel;

/// Salt separating the delivery/congestion stream from topology sampling.
const DELIVERY_STREAM: u64 = 0xD311;

/// Topology plus the time-varying attributes the delivery oracle reads.
///
/// Owns reliability, congestion and adversary roles exclusively. Loss
/// semantics come from the [`DeliveryPolicy`] supplied at construction.
#[derive(Debug)]
pub struct NetworkState {
    topology: Topology,
    adversaries: BTreeMap<NodeId, Adversary>,
    policy: Box<dyn DeliveryPolicy>,
    congestion: CongestionConfig,
    rng: DeterministicRng,
}

impl NetworkState {
    /// Wraps an existing topology.
    pub fn new(
        topology: Topology,
        policy: Box<dyn DeliveryPolicy>,
        congestion: CongestionConfig,
        seed: u64,
    ) -> Self {
        Self {
            topology,
            adversaries: BTreeMap::new(),
            policy,
            congestion,
            rng: DeterministicRng::derived(seed, DELIVERY_STREAM),
        }
    }

    /// Generates a random topology with default weights, reliability and
    /// the QoS-aware delivery policy.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidTopology` - `num_nodes < 2` or density outside (0, 1]
    pub fn create_topology(
        num_nodes: usize,
        density: f64,
        seed: u64,
    ) -> Result<Self, NetworkError> {
        let config = TrustrouteConfig {
            topology: TopologyConfig {
                num_nodes,
                density,
                seed,
                ..Default::default()
            },
            ..Default::default()
        };
        Self::from_config(&config)
    }

    /// Builds the network described by `config`.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidTopology` - Malformed topology parameters
    pub fn from_config(config: &TrustrouteConfig) -> Result<Self, NetworkError> {
        let mut rng = DeterministicRng::from_seed(config.topology.seed);
        let topology = Topology::random(&config.topology, &mut rng)?;
        debug!(
            nodes = topology.node_count(),
            links = topology.link_count(),
            seed = config.topology.seed,
            "generated topology"
        );
        Ok(Self::new(
            topology,
            config.delivery.policy.build(&config.delivery),
            config.congestion.clone(),
            config.topology.seed,
        ))
    }

    /// Wraps a hand-built topology with the default delivery settings.
    pub fn with_defaults(topology: Topology, seed: u64) -> Self {
        let delivery = DeliveryConfig::default();
        Self::new(
            topology,
            delivery.policy.build(&delivery),
            CongestionConfig::default(),
            seed,
        )
    }

    /// Advances link congestion by one tick.
    ///
    /// Each link takes a bounded random step, reverts partially toward the
    /// baseline and occasionally jumps into a burst. Returns the mean
    /// congestion after the update.
    pub fn evolve_congestion(&mut self) -> f64 {
        let config = &self.congestion;
        let rng = &mut self.rng;
        let mut total = 0.0;
        let mut count = 0usize;

        for link in self.topology.links_mut() {
            let step = rng.random_range_f64(-config.volatility, config.volatility);
            let reversion = config.mean_reversion * (config.baseline - link.congestion);
            let mut level = link.congestion + step + reversion;
            if config.burst_probability > 0.0 && rng.random_bool(config.burst_probability) {
                level = level.max(rng.random_range_f64(config.burst_floor, 1.0));
            }
            link.congestion = level.clamp(0.0, 1.0);
            total += link.congestion;
            count += 1;
        }

        let mean = if count == 0 { 0.0 } else { total / count as f64 };
        trace!(mean, "congestion evolved");
        mean
    }

    /// Walks `path` hop by hop and decides whether the packet arrives.
    ///
    /// Each visited node first applies its adversary verdict, then the
    /// delivery policy's forward probability with a single draw. A failing
    /// node receives a negative trust observation; a full traversal gives
    /// every visited node a positive one.
    pub fn deliver_packet(
        &mut self,
        path: &[NodeId],
        trust: Option<&mut TrustModel>,
        class: TrafficClass,
    ) -> DeliveryOutcome {
        let Some(&source) = path.first() else {
            return DeliveryOutcome::EmptyPath;
        };
        if !self.topology.contains(source) {
            debug!(node = source, "path starts outside the topology");
            return DeliveryOutcome::Dropped {
                node: source,
                cause: DropCause::UnknownNode,
            };
        }

        for hop in path.windows(2) {
            let (from, to) = (hop[0], hop[1]);
            let (Some(link), Some(node)) = (self.topology.link(from, to), self.topology.node(to))
            else {
                debug!(from, to, "path uses a missing link");
                return DeliveryOutcome::Dropped {
                    node: to,
                    cause: DropCause::MissingLink,
                };
            };

            let cause = if self
                .adversaries
                .get(&to)
                .is_some_and(|adversary| adversary.process_packet(class) == Verdict::Drop)
            {
                Some(DropCause::Adversary)
            } else {
                let conditions = HopConditions {
                    node: to,
                    reliability: node.reliability,
                    congestion: link.congestion,
                    class,
                };
                let probability = self.policy.forward_probability(&conditions);
                (!self.rng.random_bool(probability)).then_some(DropCause::Loss)
            };

            if let Some(cause) = cause {
                debug!(node = to, cause = cause.as_str(), %class, "packet dropped");
                if let Some(trust) = trust {
                    trust.update_trust(to, false);
                }
                return DeliveryOutcome::Dropped { node: to, cause };
            }
        }

        if let Some(trust) = trust {
            for &node in &path[1..] {
                trust.update_trust(node, true);
            }
        }
        DeliveryOutcome::Delivered {
            hops: path.len() - 1,
        }
    }

    /// Overrides a node's base reliability.
    ///
    /// # Errors
    ///
    /// - `NetworkError::UnknownNode` - `node` is not in the topology
    /// - `NetworkError::InvalidReliability` - `reliability` outside [0, 1]
    pub fn set_reliability(&mut self, node: NodeId, reliability: f64) -> Result<(), NetworkError> {
        if !(0.0..=1.0).contains(&reliability) {
            return Err(NetworkError::InvalidReliability {
                node,
                value: reliability,
            });
        }
        let entry = self
            .topology
            .node_mut(node)
            .ok_or(NetworkError::UnknownNode { node })?;
        entry.reliability = reliability;
        Ok(())
    }

    /// Changes the latency weight of an existing link.
    ///
    /// # Errors
    ///
    /// - `NetworkError::UnknownLink` - `from` and `to` are not adjacent
    /// - `NetworkError::InvalidWeight` - `weight` is not positive
    pub fn set_link_weight(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: f64,
    ) -> Result<(), NetworkError> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(NetworkError::InvalidWeight { from, to, weight });
        }
        let link = self
            .topology
            .link_mut(from, to)
            .ok_or(NetworkError::UnknownLink { from, to })?;
        link.weight = weight;
        Ok(())
    }

    /// Sets the congestion of one link.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidCongestion` - `level` outside [0, 1]
    /// - `NetworkError::UnknownLink` - `from` and `to` are not adjacent
    pub fn set_congestion(
        &mut self,
        from: NodeId,
        to: NodeId,
        level: f64,
    ) -> Result<(), NetworkError> {
        check_congestion(level)?;
        let link = self
            .topology
            .link_mut(from, to)
            .ok_or(NetworkError::UnknownLink { from, to })?;
        link.congestion = level;
        Ok(())
    }

    /// Sets every link to the same congestion level.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidCongestion` - `level` outside [0, 1]
    pub fn set_uniform_congestion(&mut self, level: f64) -> Result<(), NetworkError> {
        check_congestion(level)?;
        for link in self.topology.links_mut() {
            link.congestion = level;
        }
        Ok(())
    }

    /// Makes `node` malicious, replacing any previous role.
    ///
    /// # Errors
    ///
    /// - `NetworkError::UnknownNode` - `node` is not in the topology
    /// - `NetworkError::InvalidDwell` - an on-off phase with zero duration
    pub fn assign_adversary(&mut self, node: NodeId, kind: AttackKind) -> Result<(), NetworkError> {
        if !self.topology.contains(node) {
            return Err(NetworkError::UnknownNode { node });
        }
        if let AttackKind::OnOff {
            good_dwell,
            bad_dwell,
        } = kind
        {
            if good_dwell.is_zero() || bad_dwell.is_zero() {
                return Err(NetworkError::InvalidDwell {
                    node,
                    good_dwell,
                    bad_dwell,
                });
            }
        }
        debug!(node, kind = kind.as_str(), "adversary assigned");
        self.adversaries.insert(node, Adversary::new(node, kind));
        Ok(())
    }

    pub fn adversary(&self, node: NodeId) -> Option<&Adversary> {
        self.adversaries.get(&node)
    }

    pub fn adversary_mut(&mut self, node: NodeId) -> Option<&mut Adversary> {
        self.adversaries.get_mut(&node)
    }

    /// Iterates over malicious nodes in identifier order.
    pub fn adversaries(&self) -> impl Iterator<Item = &Adversary> + '_ {
        self.adversaries.values()
    }

    pub fn is_adversary(&self, node: NodeId) -> bool {
        self.adversaries.contains_key(&node)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.topology.contains(node)
    }

    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.topology.neighbors(node)
    }

    pub fn link(&self, from: NodeId, to: NodeId) -> Option<&Link> {
        self.topology.link(from, to)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.topology.node_ids()
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn reliability(&self, node: NodeId) -> Option<f64> {
        self.topology.node(node).map(|n| n.reliability)
    }

    /// Name of the injected delivery policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Congestion parameters driving [`NetworkState::evolve_congestion`].
    pub fn congestion_config(&self) -> &CongestionConfig {
        &self.congestion
    }

    /// Sum of link weights along `path`, `None` if a hop is not a link.
    pub fn path_latency(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2)
            .map(|hop| self.topology.link(hop[0], hop[1]).map(|link| link.weight))
            .sum()
    }

    /// Path latency with each link weight inflated by its congestion.
    pub fn effective_latency(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2)
            .map(|hop| {
                self.topology
                    .link(hop[0], hop[1])
                    .map(|link| link.weight * (1.0 + link.congestion))
            })
            .sum()
    }

    /// Whether `path` starts at `source`, ends at `destination` and only
    /// uses existing links.
    pub fn is_valid_path(&self, path: &[NodeId], source: NodeId, destination: NodeId) -> bool {
        path.first() == Some(&source)
            && path.last() == Some(&destination)
            && path.iter().all(|&node| self.topology.contains(node))
            && path
                .windows(2)
                .all(|hop| self.topology.is_adjacent(hop[0], hop[1]))
    }

    /// Read-only view for visualization collaborators.
    ///
    /// With a trust model, nodes are flagged by perceived trust; without
    /// one, by ground-truth reliability.
    pub fn snapshot(&self, trust: Option<&TrustModel>) -> NetworkSnapshot {
        let nodes = self
            .topology
            .nodes()
            .map(|node| {
                NodeView::new(
                    node,
                    trust.map(|t| t.get_trust(node.id)),
                    self.adversaries.get(&node.id).map(Adversary::kind),
                )
            })
            .collect();
        let links = self
            .topology
            .links()
            .map(|((from, to), link)| LinkView {
                from,
                to,
                weight: link.weight,
                congestion: link.congestion,
            })
            .collect();

        NetworkSnapshot {
            directed: self.topology.is_directed(),
            nodes,
            links,
        }
    }
}

fn check_congestion(level: f64) -> Result<(), NetworkError> {
    if (0.0..=1.0).contains(&level) {
        Ok(())
    } else {
        Err(NetworkError::InvalidCongestion { value: level })
    }
}
