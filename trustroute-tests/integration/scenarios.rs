//! Standard experiments run end to end.

use trustroute_core::{AttackKind, RoutingAlgorithm, TrustrouteConfig};
use trustroute_sim::{
    AttackScenario, ComparisonScenario, ScenarioRunner, SimulationScenarios,
};

fn runner(seed: u64) -> ScenarioRunner {
    let mut config = TrustrouteConfig::default();
    config.topology.seed = seed;
    config.topology.density = 0.3;
    ScenarioRunner::new(config)
}

#[test]
fn test_same_seed_reproduces_comparison() {
    let first = runner(7)
        .compare(&RoutingAlgorithm::ALL, &ComparisonScenario::default())
        .unwrap();
    let second = runner(7)
        .compare(&RoutingAlgorithm::ALL, &ComparisonScenario::default())
        .unwrap();

    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(a.report.statistics.traces, b.report.statistics.traces);
        assert_eq!(a.report.duration, b.report.duration);
    }
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn test_comparison_serializes_to_json() {
    let results = runner(42)
        .compare(
            &[RoutingAlgorithm::ShortestPath, RoutingAlgorithm::HopCount],
            &ComparisonScenario::default(),
        )
        .unwrap();

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["seed"], 42);
    assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["results"][0]["algorithm"], "shortest-path");
    assert_eq!(json["results"][0]["report"]["statistics"]["attempted"], 50);
}

#[test]
fn test_snapshot_flags_follow_trust() {
    let config = {
        let mut config = TrustrouteConfig::default();
        config.topology.density = 0.3;
        config
    };
    let scenario = ComparisonScenario {
        packets: 400,
        unreliable_reliability: 0.0,
        ..Default::default()
    };
    let mut sim =
        SimulationScenarios::comparison(&config, RoutingAlgorithm::ShortestPath, &scenario)
            .build()
            .unwrap();
    sim.run().unwrap();

    let world = sim.world();
    let snapshot = world.network.snapshot(Some(&world.trust));
    let flagged = snapshot.flagged_nodes();
    for node in flagged {
        assert!(world.trust.get_trust(node) < 0.5);
    }
    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"links\""));
}

#[test]
fn test_attack_skips_adversary_endpoints() {
    let result = runner(42)
        .attack(
            AttackKind::on_off(),
            RoutingAlgorithm::TrustWeighted,
            &AttackScenario::default(),
        )
        .unwrap();
    let stats = &result.report.statistics;

    assert_eq!(stats.attempted + stats.skipped, 200);
    assert!(stats.skipped > 0);
    assert_eq!(result.label, "on-off");
}
