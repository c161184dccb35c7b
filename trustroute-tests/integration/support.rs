//! Shared fixtures for integration tests.

use std::time::Duration;

use trustroute_core::config::{FlowSelection, TrustrouteConfig};
use trustroute_core::network::ReliabilityOnlyDelivery;
use trustroute_core::{
    DeliveryPolicy, NetworkState, NodeId, RoutingAlgorithm, Topology,
};
use trustroute_sim::{ScenarioBuilder, SimulationReport, World};

/// Line topology `0 - 1 - ... - (n-1)` with unit weights and perfect nodes.
pub fn line(num_nodes: usize, policy: Box<dyn DeliveryPolicy>) -> NetworkState {
    let edges: Vec<_> = (1..num_nodes as NodeId)
        .map(|node| (node - 1, node, 1.0))
        .collect();
    let topology = Topology::from_edges(num_nodes, &edges).unwrap();
    let mut network = NetworkState::new(
        topology,
        policy,
        TrustrouteConfig::deterministic_testing().congestion,
        42,
    );
    for node in 0..num_nodes as NodeId {
        network.set_reliability(node, 1.0).unwrap();
    }
    network
}

pub fn reliable_line(num_nodes: usize) -> NetworkState {
    line(num_nodes, Box::new(ReliabilityOnlyDelivery))
}

/// Config sending `packets` packets from `source` to `destination` every `gap`.
pub fn pinned_config(
    source: NodeId,
    destination: NodeId,
    packets: u64,
    gap: Duration,
) -> TrustrouteConfig {
    let mut config = TrustrouteConfig::deterministic_testing();
    config.traffic.flows = FlowSelection::Pinned {
        source,
        destination,
    };
    config.traffic.packet_count = packets;
    config.traffic.min_gap = gap;
    config.traffic.max_gap = gap;
    config
}

/// Runs `builder` to completion, returning the report and final world.
pub fn run(builder: ScenarioBuilder) -> (SimulationReport, World) {
    let mut sim = builder.build().unwrap();
    let report = sim.run().unwrap();
    (report, sim.into_world())
}

/// Builder over `network` with pinned traffic and frozen congestion.
pub fn pinned_builder(
    network: NetworkState,
    config: TrustrouteConfig,
    algorithm: RoutingAlgorithm,
) -> ScenarioBuilder {
    ScenarioBuilder::new(config)
        .network(network)
        .algorithm(algorithm)
        .without_congestion_process()
}
