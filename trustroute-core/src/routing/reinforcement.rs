//! Hop-by-hop routing driven by the Q-routing agent.

use tracing::trace;

use super::{Endpoints, RoutingContext, RoutingStrategy, classify_endpoints};
use crate::network::NodeId;

/// Follows the agent's next-hop choices until the destination is reached.
///
/// Revisits are allowed; the walk is abandoned once it has taken
/// `max_hops` hops without arriving (default twice the node count).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReinforcementRouting {
    max_hops: Option<usize>,
}

impl ReinforcementRouting {
    pub fn new(max_hops: Option<usize>) -> Self {
        Self { max_hops }
    }

    /// Hop budget for a network of `node_count` nodes.
    pub fn hop_budget(&self, node_count: usize) -> usize {
        self.max_hops.unwrap_or(node_count.saturating_mul(2))
    }
}

impl RoutingStrategy for ReinforcementRouting {
    fn name(&self) -> &'static str {
        "reinforcement"
    }

    fn find_path(
        &self,
        ctx: &mut RoutingContext<'_>,
        source: NodeId,
        destination: NodeId,
    ) -> Option<Vec<NodeId>> {
        match classify_endpoints(ctx.network, source, destination) {
            Endpoints::Unknown => return None,
            Endpoints::Same => return Some(vec![source]),
            Endpoints::Distinct => {}
        }

        let budget = self.hop_budget(ctx.network.node_count());
        let mut path = vec![source];
        let mut current = source;

        while current != destination {
            if path.len() > budget {
                trace!(source, destination, budget, "hop budget exhausted");
                return None;
            }
            let neighbors = ctx.network.neighbors(current);
            current = ctx.agent.choose_action(current, &neighbors)?;
            path.push(current);
        }

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::QRoutingAgent;
    use crate::config::AgentConfig;
    use crate::network::{NetworkState, Topology};
    use crate::routing::test_support::diamond;
    use crate::trust::TrustModel;

    fn greedy_agent(network: &NetworkState) -> QRoutingAgent {
        let config = AgentConfig {
            epsilon: 0.0,
            ..Default::default()
        };
        QRoutingAgent::new(&network.node_ids(), &config, 5).unwrap()
    }

    #[test]
    fn test_follows_learned_preferences() {
        let network = diamond();
        let trust = TrustModel::default();
        let mut agent = greedy_agent(&network);
        for _ in 0..50 {
            agent.learn(0, 2, 1.0, 2, &[]);
            agent.learn(2, 3, 1.0, 3, &[]);
            agent.learn(0, 1, -1.0, 1, &[]);
        }

        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
        assert_eq!(
            ReinforcementRouting::default().find_path(&mut ctx, 0, 3),
            Some(vec![0, 2, 3])
        );
    }

    #[test]
    fn test_gives_up_after_hop_budget() {
        // Agent is pinned to bounce 0 <-> 1 and never reaches 2
        let topology = Topology::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        let network = NetworkState::with_defaults(topology, 1);
        let trust = TrustModel::default();
        let mut agent = greedy_agent(&network);
        for _ in 0..50 {
            agent.learn(1, 0, 5.0, 0, &[]);
            agent.learn(1, 2, -5.0, 2, &[]);
        }

        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
        assert_eq!(ReinforcementRouting::new(Some(4)).find_path(&mut ctx, 0, 2), None);
        assert_eq!(ReinforcementRouting::default().hop_budget(3), 6);
    }

    #[test]
    fn test_exploring_paths_stay_on_links() {
        let network = NetworkState::create_topology(12, 0.4, 8).unwrap();
        let trust = TrustModel::default();
        let config = AgentConfig {
            epsilon: 1.0,
            ..Default::default()
        };
        let mut agent = QRoutingAgent::new(&network.node_ids(), &config, 2).unwrap();
        let strategy = ReinforcementRouting::default();

        for destination in 1..12 {
            let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
            if let Some(path) = strategy.find_path(&mut ctx, 0, destination) {
                assert!(network.is_valid_path(&path, 0, destination));
                assert!(path.len() <= 2 * 12 + 1);
            }
        }
    }
}
