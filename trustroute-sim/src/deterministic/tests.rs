//! Tests for the deterministic orchestrator.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use trustroute_core::config::{FlowSelection, SimulationConfig, TrafficConfig, TrustrouteConfig};
use trustroute_core::{DeterministicRng, QRoutingAgent, RoutingAlgorithm};

use crate::deterministic::{DeterministicSimulation, SimulationError, StopReason, World};
use crate::processes::{CongestionProcess, SimProcess, TrafficGenerator, Yield};

/// Appends its label to a shared log on every resumption.
#[derive(Debug)]
struct Recorder {
    label: &'static str,
    period: Duration,
    remaining: u32,
    daemon: bool,
    log: Rc<RefCell<Vec<(Duration, &'static str)>>>,
}

impl SimProcess for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn is_daemon(&self) -> bool {
        self.daemon
    }

    fn resume(&mut self, now: Duration, _world: &mut World) -> Yield {
        self.log.borrow_mut().push((now, self.label));
        if self.remaining == 0 {
            return Yield::Finish;
        }
        self.remaining -= 1;
        Yield::After(self.period)
    }
}

fn recorder(
    label: &'static str,
    period_ms: u64,
    remaining: u32,
    daemon: bool,
    log: &Rc<RefCell<Vec<(Duration, &'static str)>>>,
) -> Box<dyn SimProcess> {
    Box::new(Recorder {
        label,
        period: Duration::from_millis(period_ms),
        remaining,
        daemon,
        log: Rc::clone(log),
    })
}

fn world(config: &TrustrouteConfig) -> World {
    World::from_config(config).unwrap()
}

fn simulation(config: &TrustrouteConfig) -> DeterministicSimulation {
    DeterministicSimulation::new(world(config), config.simulation.clone(), config.topology.seed)
}

fn traffic(config: &TrustrouteConfig, algorithm: RoutingAlgorithm) -> Box<dyn SimProcess> {
    Box::new(TrafficGenerator::new(
        algorithm,
        &config.agent,
        config.traffic.clone(),
        config.topology.seed,
    ))
}

#[test]
fn test_same_time_wakes_follow_insertion_order() {
    let config = TrustrouteConfig::deterministic_testing();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sim = simulation(&config);

    sim.spawn(recorder("a", 100, 2, false, &log)).unwrap();
    sim.spawn(recorder("b", 100, 2, false, &log)).unwrap();
    sim.spawn_after(Duration::from_millis(100), recorder("c", 100, 0, false, &log))
        .unwrap();
    let report = sim.run().unwrap();

    let labels: Vec<_> = log.borrow().iter().map(|(_, label)| *label).collect();
    assert_eq!(labels, vec!["a", "b", "c", "a", "b", "a", "b"]);
    assert_eq!(report.stop_reason, StopReason::ProcessesFinished);
    assert_eq!(report.duration, Duration::from_millis(200));
    assert_eq!(report.wakes_processed, 7);
}

#[test]
fn test_daemons_do_not_keep_run_alive() {
    let config = TrustrouteConfig::deterministic_testing();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sim = simulation(&config);

    sim.spawn(recorder("daemon", 10, u32::MAX, true, &log)).unwrap();
    sim.spawn(recorder("work", 1_000, 1, false, &log)).unwrap();
    let report = sim.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::ProcessesFinished);
    assert_eq!(report.duration, Duration::from_secs(1));
    assert!(sim.pending_wakes() > 0);
}

#[test]
fn test_daemons_alone_run_to_deadline() {
    let config = TrustrouteConfig::deterministic_testing();
    let mut sim = simulation(&config);

    sim.spawn(Box::new(CongestionProcess::new(Duration::from_secs(1))))
        .unwrap();
    let report = sim.run_for(Duration::from_secs(30)).unwrap();

    assert_eq!(report.stop_reason, StopReason::TimeLimit);
    assert_eq!(report.duration, Duration::from_secs(30));
    assert_eq!(report.wakes_processed, 31);
}

#[test]
fn test_packet_budget_stops_run() {
    let mut config = TrustrouteConfig::deterministic_testing();
    config.traffic.packet_count = 100;
    let mut sim = simulation(&config).with_packet_budget(10);

    sim.spawn(traffic(&config, RoutingAlgorithm::HopCount)).unwrap();
    let report = sim.run().unwrap();

    assert_eq!(report.stop_reason, StopReason::PacketBudget);
    assert_eq!(report.statistics.attempted, 10);
}

#[test]
fn test_queue_capacity_is_enforced() {
    let config = TrustrouteConfig {
        simulation: SimulationConfig {
            event_queue_capacity: 2,
            ..Default::default()
        },
        ..TrustrouteConfig::deterministic_testing()
    };
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sim = simulation(&config);

    sim.spawn(recorder("a", 1, 1, false, &log)).unwrap();
    sim.spawn(recorder("b", 1, 1, false, &log)).unwrap();
    let result = sim.spawn(recorder("c", 1, 1, false, &log));
    assert!(matches!(
        result,
        Err(SimulationError::EventQueueOverflow { count: 2 })
    ));
}

#[test]
fn test_traffic_run_accounts_for_every_packet() {
    let mut config = TrustrouteConfig::deterministic_testing();
    config.traffic.packet_count = 40;
    let mut sim = simulation(&config);

    sim.spawn(Box::new(CongestionProcess::new(config.congestion.tick)))
        .unwrap();
    sim.spawn(traffic(&config, RoutingAlgorithm::TrustWeighted))
        .unwrap();
    let report = sim.run().unwrap();
    let stats = &report.statistics;

    assert_eq!(stats.attempted, 40);
    assert_eq!(stats.delivered + stats.dropped + stats.no_path, 40);
    assert_eq!(stats.traces.len(), 40);
    assert!(report.summary().contains("40 attempted"));
}

#[test]
fn test_world_agent_draws_from_derived_stream() {
    let mut config = TrustrouteConfig::deterministic_testing();
    config.agent.epsilon = 1.0;
    let mut world = World::from_config(&config).unwrap();
    let nodes = world.network.node_ids();
    let mut expected = QRoutingAgent::new(
        &nodes,
        &config.agent,
        DeterministicRng::derive_seed(config.topology.seed, 0xA6E7),
    )
    .unwrap();

    for _ in 0..64 {
        assert_eq!(
            world.agent.choose_action(0, &nodes),
            expected.choose_action(0, &nodes)
        );
    }
}

#[test]
fn test_simulation_reproducibility() {
    let run = || {
        let mut config = TrustrouteConfig::default();
        config.traffic.packet_count = 60;
        config.traffic.flows = FlowSelection::RandomPairs;
        let mut sim = simulation(&config);
        sim.spawn(Box::new(CongestionProcess::new(config.congestion.tick)))
            .unwrap();
        sim.spawn(traffic(&config, RoutingAlgorithm::Reinforcement))
            .unwrap();
        sim.run().unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.statistics.traces, second.statistics.traces);
    assert_eq!(first.duration, second.duration);
    assert_eq!(first.wakes_processed, second.wakes_processed);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn same_seed_replays_identically(seed in any::<u64>(), packets in 1u64..40) {
        let run = |seed: u64| {
            let mut config = TrustrouteConfig::default();
            config.topology.seed = seed;
            config.traffic = TrafficConfig {
                packet_count: packets,
                ..Default::default()
            };
            let mut sim = simulation(&config);
            sim.spawn(Box::new(CongestionProcess::new(config.congestion.tick))).unwrap();
            sim.spawn(traffic(&config, RoutingAlgorithm::ShortestPath)).unwrap();
            sim.run().unwrap()
        };

        let first = run(seed);
        let second = run(seed);
        prop_assert_eq!(first.statistics.attempted, packets);
        prop_assert_eq!(&first.statistics.traces, &second.statistics.traces);
        prop_assert_eq!(first.duration, second.duration);
    }
}
