//! Graph structure over simulated nodes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{DEFAULT_RELIABILITY, NetworkError, NodeId};
use crate::config::TopologyConfig;
use crate::rng::DeterministicRng;

/// A simulated router.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// Probability of forwarding correctly, independent of congestion
    pub reliability: f64,
}

/// Connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    /// Latency weight used as routing cost base
    pub weight: f64,
    /// Current load factor in [0, 1]
    pub congestion: f64,
}

/// Simple graph with weighted links.
///
/// Undirected topologies store one link record per unordered pair, so
/// both directions share weight and congestion.
#[derive(Debug, Clone)]
pub struct Topology {
    directed: bool,
    nodes: BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    links: BTreeMap<(NodeId, NodeId), Link>,
}

impl Topology {
    /// Creates an empty undirected topology.
    pub fn undirected() -> Self {
        Self::empty(false)
    }

    /// Creates an empty directed topology.
    pub fn directed() -> Self {
        Self::empty(true)
    }

    fn empty(directed: bool) -> Self {
        Self {
            directed,
            nodes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// Generates a random undirected graph.
    ///
    /// Each unordered pair is linked independently with probability
    /// `config.density`; weights are uniform in the configured range.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidTopology` - Fewer than two nodes, density outside (0, 1] or an empty weight range
    pub fn random(config: &TopologyConfig, rng: &mut DeterministicRng) -> Result<Self, NetworkError> {
        if config.num_nodes < 2 {
            return Err(NetworkError::InvalidTopology {
                reason: format!("need at least 2 nodes, got {}", config.num_nodes),
            });
        }
        if !(config.density > 0.0 && config.density <= 1.0) {
            return Err(NetworkError::InvalidTopology {
                reason: format!("density {} outside (0, 1]", config.density),
            });
        }
        if !(config.min_weight > 0.0 && config.min_weight <= config.max_weight) {
            return Err(NetworkError::InvalidTopology {
                reason: format!(
                    "weight range [{}, {}) must be positive and non-empty",
                    config.min_weight, config.max_weight
                ),
            });
        }
        let node_count = NodeId::try_from(config.num_nodes).map_err(|_| {
            NetworkError::InvalidTopology {
                reason: format!("{} nodes exceed the identifier space", config.num_nodes),
            }
        })?;

        let mut topology = Self::undirected();
        for id in 0..node_count {
            topology.add_node(id, config.default_reliability)?;
        }

        for u in 0..node_count {
            for v in (u + 1)..node_count {
                if rng.random_bool(config.density) {
                    let weight = rng.random_range_f64(config.min_weight, config.max_weight);
                    topology.add_link(u, v, weight)?;
                }
            }
        }

        if config.connect_isolated {
            for u in 0..node_count {
                if topology.degree(u) > 0 {
                    continue;
                }
                let mut v = rng.random_range(0, u64::from(node_count) - 1) as NodeId;
                if v >= u {
                    v += 1;
                }
                let weight = rng.random_range_f64(config.min_weight, config.max_weight);
                topology.add_link(u, v, weight)?;
            }
        }

        Ok(topology)
    }

    /// Builds an undirected topology over nodes `0..num_nodes` from an edge list.
    ///
    /// # Errors
    ///
    /// - `NetworkError::UnknownNode` - An edge references a node outside the range
    /// - `NetworkError::InvalidWeight` - An edge weight is not positive
    /// - `NetworkError::InvalidTopology` - An edge is a self-loop
    pub fn from_edges(
        num_nodes: usize,
        edges: &[(NodeId, NodeId, f64)],
    ) -> Result<Self, NetworkError> {
        let mut topology = Self::undirected();
        for id in 0..num_nodes {
            let id = NodeId::try_from(id).map_err(|_| NetworkError::InvalidTopology {
                reason: format!("{num_nodes} nodes exceed the identifier space"),
            })?;
            topology.add_node(id, DEFAULT_RELIABILITY)?;
        }
        for &(u, v, weight) in edges {
            topology.add_link(u, v, weight)?;
        }
        Ok(topology)
    }

    /// Adds a node, replacing the reliability of an existing one.
    ///
    /// # Errors
    ///
    /// - `NetworkError::InvalidReliability` - `reliability` outside [0, 1]
    pub fn add_node(&mut self, id: NodeId, reliability: f64) -> Result<(), NetworkError> {
        if !(0.0..=1.0).contains(&reliability) {
            return Err(NetworkError::InvalidReliability {
                node: id,
                value: reliability,
            });
        }
        self.nodes.insert(id, Node { id, reliability });
        self.adjacency.entry(id).or_default();
        Ok(())
    }

    /// Adds or replaces the link `from -> to` (both ways when undirected).
    ///
    /// # Errors
    ///
    /// - `NetworkError::UnknownNode` - Either endpoint is missing
    /// - `NetworkError::InvalidWeight` - `weight` is not positive
    /// - `NetworkError::InvalidTopology` - `from == to`
    pub fn add_link(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<(), NetworkError> {
        for node in [from, to] {
            if !self.nodes.contains_key(&node) {
                return Err(NetworkError::UnknownNode { node });
            }
        }
        if from == to {
            return Err(NetworkError::InvalidTopology {
                reason: format!("self-loop on node {from}"),
            });
        }
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(NetworkError::InvalidWeight { from, to, weight });
        }

        self.links.insert(
            self.key(from, to),
            Link {
                weight,
                congestion: 0.0,
            },
        );
        self.adjacency.entry(from).or_default().insert(to);
        if !self.directed {
            self.adjacency.entry(to).or_default().insert(from);
        }
        Ok(())
    }

    fn key(&self, from: NodeId, to: NodeId) -> (NodeId, NodeId) {
        if self.directed || from <= to {
            (from, to)
        } else {
            (to, from)
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(&node)
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node)
    }

    /// Iterates over nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Node identifiers in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of link records (unordered pairs when undirected).
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Returns the link traversed when moving `from -> to`.
    pub fn link(&self, from: NodeId, to: NodeId) -> Option<&Link> {
        if !self.is_adjacent(from, to) {
            return None;
        }
        self.links.get(&self.key(from, to))
    }

    pub(crate) fn link_mut(&mut self, from: NodeId, to: NodeId) -> Option<&mut Link> {
        if !self.is_adjacent(from, to) {
            return None;
        }
        let key = self.key(from, to);
        self.links.get_mut(&key)
    }

    /// Iterates over link records keyed by endpoint pair.
    pub fn links(&self) -> impl Iterator<Item = ((NodeId, NodeId), &Link)> + '_ {
        self.links.iter().map(|(key, link)| (*key, link))
    }

    pub(crate) fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> + '_ {
        self.links.values_mut()
    }

    /// Whether `to` can be reached from `from` in one hop.
    pub fn is_adjacent(&self, from: NodeId, to: NodeId) -> bool {
        self.adjacency
            .get(&from)
            .is_some_and(|neighbors| neighbors.contains(&to))
    }

    /// Next hops reachable from `node` in ascending order.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.adjacency
            .get(&node)
            .map(|neighbors| neighbors.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }
}
