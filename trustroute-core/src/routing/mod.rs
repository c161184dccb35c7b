//! Path selection strategies.
//!
//! Every strategy answers the same question: given the live network and
//! trust view, which node sequence should a packet from `source` to
//! `destination` follow? `None` means no route could be produced.

mod hop_count;
mod reinforcement;
mod shortest_path;
mod trust_weighted;

use std::fmt;

use serde::Serialize;

pub use hop_count::HopCountRouting;
pub use reinforcement::ReinforcementRouting;
pub use shortest_path::ShortestPathRouting;
pub use trust_weighted::{TRUST_PENALTY, TrustWeightedRouting};

use crate::agent::QRoutingAgent;
use crate::config::AgentConfig;
use crate::network::{NetworkState, NodeId};
use crate::trust::TrustModel;

/// Borrowed views a strategy consults for a single routing decision.
///
/// Nothing here is cached between calls; the orchestrator lends its
/// current state each time.
#[derive(Debug)]
pub struct RoutingContext<'a> {
    pub network: &'a NetworkState,
    pub trust: &'a TrustModel,
    pub agent: &'a mut QRoutingAgent,
}

impl<'a> RoutingContext<'a> {
    pub fn new(
        network: &'a NetworkState,
        trust: &'a TrustModel,
        agent: &'a mut QRoutingAgent,
    ) -> Self {
        Self {
            network,
            trust,
            agent,
        }
    }
}

/// A path selection algorithm.
pub trait RoutingStrategy: fmt::Debug + Send {
    /// Label used in traces and reports.
    fn name(&self) -> &'static str;

    /// Computes a route, or `None` if none exists.
    ///
    /// Returned paths start at `source`, end at `destination` and only use
    /// existing links. `source == destination` yields `[source]`.
    fn find_path(
        &self,
        ctx: &mut RoutingContext<'_>,
        source: NodeId,
        destination: NodeId,
    ) -> Option<Vec<NodeId>>;
}

/// Strategies selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingAlgorithm {
    /// Dijkstra over link latency (OSPF-like)
    ShortestPath,
    /// Fewest hops, weights ignored (RIP-like)
    HopCount,
    /// Dijkstra with cost inflated by distrust of the next node
    TrustWeighted,
    /// Hop-by-hop decisions from the Q-routing agent
    Reinforcement,
}

impl RoutingAlgorithm {
    pub const ALL: [RoutingAlgorithm; 4] = [
        RoutingAlgorithm::ShortestPath,
        RoutingAlgorithm::HopCount,
        RoutingAlgorithm::TrustWeighted,
        RoutingAlgorithm::Reinforcement,
    ];

    /// Builds the strategy, taking the hop budget from `agent`.
    pub fn build(self, agent: &AgentConfig) -> Box<dyn RoutingStrategy> {
        match self {
            RoutingAlgorithm::ShortestPath => Box::new(ShortestPathRouting),
            RoutingAlgorithm::HopCount => Box::new(HopCountRouting),
            RoutingAlgorithm::TrustWeighted => Box::new(TrustWeightedRouting::default()),
            RoutingAlgorithm::Reinforcement => Box::new(ReinforcementRouting::new(agent.max_hops)),
        }
    }

    /// Returns string representation for traces and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingAlgorithm::ShortestPath => "shortest-path",
            RoutingAlgorithm::HopCount => "hop-count",
            RoutingAlgorithm::TrustWeighted => "trust-weighted",
            RoutingAlgorithm::Reinforcement => "reinforcement",
        }
    }
}

impl fmt::Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a request relates to the node set before any search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoints {
    Unknown,
    Same,
    Distinct,
}

fn classify_endpoints(network: &NetworkState, source: NodeId, destination: NodeId) -> Endpoints {
    if !network.contains(source) || !network.contains(destination) {
        Endpoints::Unknown
    } else if source == destination {
        Endpoints::Same
    } else {
        Endpoints::Distinct
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{agent, diamond};
    use super::*;

    #[test]
    fn test_every_strategy_handles_trivial_requests() {
        let network = diamond();
        let trust = TrustModel::default();
        let mut agent = agent(&network);

        for algorithm in RoutingAlgorithm::ALL {
            let strategy = algorithm.build(&AgentConfig::default());
            let mut ctx = RoutingContext::new(&network, &trust, &mut agent);

            assert_eq!(strategy.find_path(&mut ctx, 2, 2), Some(vec![2]), "{algorithm}");
            assert_eq!(strategy.find_path(&mut ctx, 0, 42), None, "{algorithm}");
            assert_eq!(strategy.find_path(&mut ctx, 42, 0), None, "{algorithm}");
            assert_eq!(strategy.find_path(&mut ctx, 0, 5), None, "{algorithm}");
            assert_eq!(strategy.name(), algorithm.as_str());
        }
    }

    #[test]
    fn test_deterministic_strategies_agree_on_cheap_route() {
        let network = diamond();
        let trust = TrustModel::default();
        let mut agent = agent(&network);

        for algorithm in [
            RoutingAlgorithm::ShortestPath,
            RoutingAlgorithm::TrustWeighted,
        ] {
            let strategy = algorithm.build(&AgentConfig::default());
            let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
            assert_eq!(strategy.find_path(&mut ctx, 0, 3), Some(vec![0, 1, 3]));
        }
    }
}
