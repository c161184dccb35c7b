//! Class-differentiated delivery under congestion.

use std::time::Duration;

use trustroute_core::config::DeliveryConfig;
use trustroute_core::{DeliveryPolicyKind, RoutingAlgorithm, TrafficClass};

use crate::support::{line, pinned_builder, pinned_config, run};

#[test]
fn test_voice_outperforms_data_under_congestion() {
    let policy = DeliveryPolicyKind::QosAware.build(&DeliveryConfig::default());
    let config = pinned_config(0, 2, 1_000, Duration::from_millis(100));
    let builder = pinned_builder(line(3, policy), config, RoutingAlgorithm::ShortestPath)
        .uniform_congestion(0.8);

    let (report, _) = run(builder);
    let stats = &report.statistics;
    let voice = stats.class_delivery_ratio(TrafficClass::Voice);
    let data = stats.class_delivery_ratio(TrafficClass::Data);

    // Two hops at 0.92 and 0.6 per hop: about 0.85 against 0.36
    assert!(voice > data, "voice {voice} should beat data {data}");
    assert!(voice - data > 0.3);
}

#[test]
fn test_classes_match_without_congestion() {
    let policy = DeliveryPolicyKind::QosAware.build(&DeliveryConfig::default());
    let config = pinned_config(0, 2, 200, Duration::from_millis(100));
    let builder = pinned_builder(line(3, policy), config, RoutingAlgorithm::ShortestPath)
        .uniform_congestion(0.0);

    let (report, _) = run(builder);
    let stats = &report.statistics;
    assert_eq!(stats.class_delivery_ratio(TrafficClass::Voice), 1.0);
    assert_eq!(stats.class_delivery_ratio(TrafficClass::Data), 1.0);
}

#[test]
fn test_congestion_only_policy_ignores_reliability() {
    let policy = DeliveryPolicyKind::CongestionOnly.build(&DeliveryConfig::default());
    let mut network = line(3, policy);
    network.set_reliability(1, 0.0).unwrap();
    let config = pinned_config(0, 2, 50, Duration::from_millis(100));
    let builder = pinned_builder(network, config, RoutingAlgorithm::HopCount);

    let (report, _) = run(builder);
    assert_eq!(report.statistics.delivered, 50);
}
