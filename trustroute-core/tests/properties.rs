//! Property tests for trust bounds and routing correctness.

use proptest::prelude::*;
use trustroute_core::config::{AgentConfig, TrustConfig};
use trustroute_core::{
    NetworkState, QRoutingAgent, RoutingAlgorithm, RoutingContext, Topology, TrustModel,
};

fn outcome_sequence() -> impl Strategy<Value = Vec<(u32, bool)>> {
    prop::collection::vec((0u32..8, any::<bool>()), 0..300)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn trust_stays_within_unit_interval(
        initial in 0.0f64..=1.0,
        decay in 0.0f64..0.999,
        bonus in 0.0f64..0.5,
        outcomes in outcome_sequence(),
    ) {
        let config = TrustConfig {
            initial_trust: initial,
            decay_factor: decay,
            bonus_factor: bonus,
        };
        let mut trust = TrustModel::new(&config).unwrap();
        for (node, success) in outcomes {
            trust.update_trust(node, success);
            let score = trust.get_trust(node);
            prop_assert!((0.0..=1.0).contains(&score), "score {score}");
        }
        for (_, score) in trust.scores() {
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn routed_paths_are_valid(
        num_nodes in 2usize..25,
        density in 0.05f64..=1.0,
        seed in any::<u64>(),
        source in 0u32..25,
        destination in 0u32..25,
    ) {
        let network = NetworkState::create_topology(num_nodes, density, seed).unwrap();
        let trust = TrustModel::default();
        let mut agent =
            QRoutingAgent::new(&network.node_ids(), &AgentConfig::default(), seed).unwrap();
        let known = network.contains(source) && network.contains(destination);

        for algorithm in RoutingAlgorithm::ALL {
            let strategy = algorithm.build(&AgentConfig::default());
            let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
            match strategy.find_path(&mut ctx, source, destination) {
                Some(path) => {
                    prop_assert!(known);
                    prop_assert!(network.is_valid_path(&path, source, destination), "{algorithm}: {path:?}");
                    if algorithm != RoutingAlgorithm::Reinforcement {
                        let mut seen = path.clone();
                        seen.sort_unstable();
                        seen.dedup();
                        prop_assert_eq!(seen.len(), path.len(), "{} revisited a node", algorithm);
                    }
                }
                None => prop_assert!(!(known && source == destination), "{algorithm} lost a trivial route"),
            }
        }
    }

    #[test]
    fn disconnected_components_yield_no_path(
        left in 2u32..8,
        right in 2u32..8,
        seed in any::<u64>(),
    ) {
        // Two chains 0..left and left..left+right with no bridge
        let total = left + right;
        let edges: Vec<_> = (0..total - 1)
            .filter(|&u| u + 1 != left)
            .map(|u| (u, u + 1, 1.0 + f64::from(u)))
            .collect();
        let topology = Topology::from_edges(total as usize, &edges).unwrap();
        let network = NetworkState::with_defaults(topology, seed);
        let trust = TrustModel::default();
        let mut agent =
            QRoutingAgent::new(&network.node_ids(), &AgentConfig::default(), seed).unwrap();

        for algorithm in RoutingAlgorithm::ALL {
            let strategy = algorithm.build(&AgentConfig::default());
            let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
            prop_assert_eq!(strategy.find_path(&mut ctx, 0, total - 1), None);
            prop_assert_eq!(strategy.find_path(&mut ctx, left, left - 1), None);
        }
    }
}

#[test]
fn test_hop_count_path_is_never_longer_than_shortest_path() {
    let network = NetworkState::create_topology(30, 0.15, 99).unwrap();
    let trust = TrustModel::default();
    let mut agent = QRoutingAgent::new(&network.node_ids(), &AgentConfig::default(), 1).unwrap();
    let hop_count = RoutingAlgorithm::HopCount.build(&AgentConfig::default());
    let shortest = RoutingAlgorithm::ShortestPath.build(&AgentConfig::default());

    for destination in 1..30 {
        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
        let by_hops = hop_count.find_path(&mut ctx, 0, destination);
        let by_latency = shortest.find_path(&mut ctx, 0, destination);
        match (by_hops, by_latency) {
            (Some(hops), Some(latency)) => {
                assert!(hops.len() <= latency.len());
                assert!(network.path_latency(&latency) <= network.path_latency(&hops));
            }
            (None, None) => {}
            other => panic!("strategies disagree on reachability: {other:?}"),
        }
    }
}
