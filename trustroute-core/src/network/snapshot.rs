//! Serializable views of the network for external renderers.

use serde::Serialize;

use super::NodeId;
use super::topology::Node;
use crate::adversary::AttackKind;

/// Nodes whose perceived trust falls below this are highlighted.
pub const TRUST_FLAG_THRESHOLD: f64 = 0.5;

/// Nodes whose reliability falls below this are highlighted when no trust
/// model is attached.
pub const RELIABILITY_FLAG_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub reliability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adversary: Option<AttackKind>,
    pub flagged: bool,
}

impl NodeView {
    pub(crate) fn new(node: &Node, trust: Option<f64>, adversary: Option<AttackKind>) -> Self {
        let flagged = match trust {
            Some(score) => score < TRUST_FLAG_THRESHOLD,
            None => node.reliability < RELIABILITY_FLAG_THRESHOLD,
        };
        Self {
            id: node.id,
            reliability: node.reliability,
            trust,
            adversary,
            flagged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkView {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
    pub congestion: f64,
}

/// Point-in-time copy of nodes and links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub directed: bool,
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
}

impl NetworkSnapshot {
    /// Identifiers of highlighted nodes.
    pub fn flagged_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.flagged)
            .map(|node| node.id)
            .collect()
    }

    /// Renders the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a value cannot be encoded.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::network::{NetworkState, Topology};
    use crate::trust::TrustModel;

    fn network() -> NetworkState {
        let topology = Topology::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        NetworkState::with_defaults(topology, 1)
    }

    #[test]
    fn test_reliability_flags_without_trust() {
        let mut network = network();
        network.set_reliability(2, 0.6).unwrap();

        let snapshot = network.snapshot(None);
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.links.len(), 2);
        assert_eq!(snapshot.flagged_nodes(), vec![2]);
    }

    #[test]
    fn test_trust_flags_override_reliability() {
        let mut network = network();
        network.set_reliability(2, 0.6).unwrap();
        let mut trust = TrustModel::default();
        for _ in 0..20 {
            trust.update_trust(1, false);
        }

        let snapshot = network.snapshot(Some(&trust));
        assert_eq!(snapshot.flagged_nodes(), vec![1]);
        assert!(snapshot.nodes[0].trust.is_some());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut network = network();
        network
            .assign_adversary(1, crate::adversary::AttackKind::Blackhole)
            .unwrap();
        let json = network.snapshot(None).to_json().unwrap();
        assert!(json.contains("\"blackhole\""));
        assert!(json.contains("\"congestion\""));
    }
}
