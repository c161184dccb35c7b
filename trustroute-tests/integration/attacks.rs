//! Adversary behavior observed through routed traffic.

use std::time::Duration;

use trustroute_core::{AttackKind, DropCause, NetworkError, RoutingAlgorithm, TrafficClass};
use trustroute_sim::SimulationError;

use crate::support::{pinned_builder, pinned_config, reliable_line, run};

#[test]
fn test_blackhole_drops_every_packet() {
    let config = pinned_config(0, 2, 100, Duration::from_millis(100));
    let builder = pinned_builder(reliable_line(3), config, RoutingAlgorithm::HopCount)
        .adversary(1, AttackKind::Blackhole);

    let (report, world) = run(builder);
    let stats = &report.statistics;

    assert_eq!(stats.attempted, 100);
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.drops_by_node.get(&1), Some(&100));
    assert_eq!(stats.drops_by_cause.get(&DropCause::Adversary), Some(&100));
    assert!(world.trust.get_trust(1) < 0.01);
}

#[test]
fn test_on_off_drops_a_fifth_of_traffic() {
    // 20s good and 5s bad, sampled every 0.5s over ten full cycles
    let config = pinned_config(0, 2, 500, Duration::from_millis(500));
    let builder = pinned_builder(reliable_line(3), config, RoutingAlgorithm::HopCount)
        .adversary(1, AttackKind::on_off());

    let (report, _) = run(builder);
    let stats = &report.statistics;
    let drop_rate = stats.dropped as f64 / stats.attempted as f64;

    assert_eq!(stats.attempted, 500);
    assert!(
        (0.17..=0.23).contains(&drop_rate),
        "on-off drop rate {drop_rate} outside expected band"
    );
    assert_eq!(stats.drops_by_node.get(&1), Some(&stats.dropped));
}

#[test]
fn test_zero_dwell_on_off_is_refused_before_running() {
    let config = pinned_config(0, 2, 5, Duration::from_millis(100));
    let stuck = AttackKind::OnOff {
        good_dwell: Duration::ZERO,
        bad_dwell: Duration::ZERO,
    };
    let result = pinned_builder(reliable_line(3), config, RoutingAlgorithm::HopCount)
        .adversary(1, stuck)
        .build();

    assert!(matches!(
        result,
        Err(SimulationError::Network(NetworkError::InvalidDwell { node: 1, .. }))
    ));
}

#[test]
fn test_on_off_drops_only_during_bad_phase() {
    let config = pinned_config(0, 2, 100, Duration::from_millis(500));
    let builder = pinned_builder(reliable_line(3), config, RoutingAlgorithm::HopCount)
        .adversary(1, AttackKind::on_off());

    let (report, _) = run(builder);
    for trace in &report.statistics.traces {
        let phase = trace.timestamp % 25.0;
        let dropped = trace.dropped_at.is_some();
        assert_eq!(dropped, phase >= 20.0, "packet at {}s", trace.timestamp);
    }
}

#[test]
fn test_grayhole_targets_one_class() {
    let config = pinned_config(0, 2, 200, Duration::from_millis(100));
    let builder = pinned_builder(reliable_line(3), config, RoutingAlgorithm::ShortestPath)
        .adversary(1, AttackKind::grayhole());

    let (report, _) = run(builder);
    let stats = &report.statistics;

    assert_eq!(stats.class_delivery_ratio(TrafficClass::Voice), 1.0);
    assert_eq!(stats.class_delivery_ratio(TrafficClass::Data), 0.0);
}

#[test]
fn test_trust_weighted_avoids_blackhole_with_detour() {
    use trustroute_core::network::ReliabilityOnlyDelivery;
    use trustroute_core::{NetworkState, Topology};

    // Cheap route through 1, expensive detour through 2
    let topology =
        Topology::from_edges(4, &[(0, 1, 1.0), (1, 3, 1.0), (0, 2, 3.0), (2, 3, 3.0)]).unwrap();
    let mut network = NetworkState::new(
        topology,
        Box::new(ReliabilityOnlyDelivery),
        Default::default(),
        42,
    );
    for node in 0..4 {
        network.set_reliability(node, 1.0).unwrap();
    }

    let config = pinned_config(0, 3, 100, Duration::from_millis(100));
    let trusting = pinned_builder(network, config, RoutingAlgorithm::TrustWeighted)
        .adversary(1, AttackKind::Blackhole);
    let (report, _) = run(trusting);
    let stats = &report.statistics;

    // Early packets are lost until distrust outweighs the detour cost
    assert!(stats.dropped > 0);
    assert!(stats.dropped < 20);
    let last = stats.traces.last().unwrap();
    assert_eq!(last.path.as_deref(), Some(&[0, 2, 3][..]));
}
