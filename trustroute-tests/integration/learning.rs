//! Q-routing agent learning from delivery feedback.

use std::time::Duration;

use trustroute_core::{AttackKind, RoutingAlgorithm, TrustrouteConfig};
use trustroute_sim::{RewardPolicy, ScenarioRunner, TrainingScenario};

use crate::support::{pinned_builder, pinned_config, reliable_line, run};

#[test]
fn test_two_node_value_converges_to_path_cost() {
    let config = pinned_config(0, 1, 200, Duration::from_millis(100));
    let builder = pinned_builder(reliable_line(2), config, RoutingAlgorithm::Reinforcement);

    let (report, mut world) = run(builder);

    assert_eq!(report.statistics.delivered, 200);
    assert!((world.agent.q_value(0, 1) + 1.0).abs() < 1e-6);
    assert_eq!(world.agent.q_value(1, 0), 0.0);

    world.agent.set_epsilon(0.0).unwrap();
    for _ in 0..1000 {
        assert_eq!(world.agent.choose_action(0, &[1]), Some(1));
    }
}

#[test]
fn test_hop_count_reward_ignores_link_weight() {
    let mut network = reliable_line(2);
    network.set_link_weight(0, 1, 5.0).unwrap();
    let config = pinned_config(0, 1, 200, Duration::from_millis(100));
    let builder = pinned_builder(network, config, RoutingAlgorithm::Reinforcement)
        .reward(RewardPolicy::NegativeHopCount);

    let (_, world) = run(builder);
    assert!((world.agent.q_value(0, 1) + 1.0).abs() < 1e-6);
}

#[test]
fn test_failures_are_penalized() {
    let config = pinned_config(0, 2, 100, Duration::from_millis(100));
    let builder = pinned_builder(reliable_line(3), config, RoutingAlgorithm::Reinforcement)
        .adversary(1, AttackKind::Blackhole);

    let (_, world) = run(builder);
    assert!(world.agent.q_value(0, 1) < -50.0);
}

#[test]
fn test_training_then_exploitation() {
    let mut config = TrustrouteConfig::default();
    config.topology.density = 0.3;
    let result = ScenarioRunner::new(config)
        .train(&TrainingScenario::default())
        .unwrap();

    assert_eq!(result.training.statistics.attempted, 500);
    assert_eq!(result.exploitation.statistics.attempted, 50);
    assert!(result.learned_pairs > 0);
    assert!(result.summary().contains("Exploitation phase"));
}
