//! Routed paths across generated and hand-built topologies.

use std::time::Duration;

use proptest::prelude::*;
use trustroute_core::network::ReliabilityOnlyDelivery;
use trustroute_core::{NetworkState, RoutingAlgorithm, Topology, TrustrouteConfig};
use trustroute_sim::{ComparisonScenario, SimulationScenarios, TraceStatus};

use crate::support::{pinned_builder, pinned_config, run};

fn split_network() -> NetworkState {
    let topology =
        Topology::from_edges(6, &[(0, 1, 1.0), (1, 2, 1.0), (3, 4, 1.0), (4, 5, 1.0)]).unwrap();
    NetworkState::new(
        topology,
        Box::new(ReliabilityOnlyDelivery),
        Default::default(),
        42,
    )
}

#[test]
fn test_disconnected_components_yield_no_path() {
    for algorithm in RoutingAlgorithm::ALL {
        let config = pinned_config(0, 4, 20, Duration::from_millis(100));
        let (report, world) = run(pinned_builder(split_network(), config, algorithm));
        let stats = &report.statistics;

        assert_eq!(stats.no_path, 20, "{algorithm}");
        assert_eq!(stats.delivered + stats.dropped, 0, "{algorithm}");
        assert!(stats.traces.iter().all(|t| t.status == TraceStatus::NoPath));
        assert_eq!(world.trust.observed_nodes(), 0, "{algorithm}");
    }
}

#[test]
fn test_no_path_leaves_agent_untrained() {
    let config = pinned_config(0, 4, 20, Duration::from_millis(100));
    let (_, world) = run(pinned_builder(
        split_network(),
        config,
        RoutingAlgorithm::Reinforcement,
    ));
    assert_eq!(world.agent.table_len(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn routed_paths_follow_links(seed in any::<u64>(), algorithm_index in 0usize..4) {
        let mut config = TrustrouteConfig::default();
        config.topology.seed = seed;
        config.topology.density = 0.3;
        let algorithm = RoutingAlgorithm::ALL[algorithm_index];
        let scenario = ComparisonScenario {
            packets: 30,
            ..Default::default()
        };

        let mut sim = SimulationScenarios::comparison(&config, algorithm, &scenario)
            .build()
            .unwrap();
        let report = sim.run().unwrap();
        let network = &sim.world().network;

        prop_assert_eq!(report.statistics.attempted, 30);
        for trace in &report.statistics.traces {
            match &trace.path {
                Some(path) => prop_assert!(
                    network.is_valid_path(path, trace.source, trace.destination),
                    "{} routed invalid path {:?}", algorithm, path
                ),
                None => prop_assert_eq!(trace.status, TraceStatus::NoPath),
            }
        }
    }
}
