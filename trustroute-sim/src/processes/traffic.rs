use std::time::Duration;

use tracing::{debug, trace};
use trustroute_core::config::{AgentConfig, FlowSelection, TrafficConfig};
use trustroute_core::{
    DeterministicRng, Flow, NodeId, RoutingAlgorithm, RoutingContext, RoutingStrategy,
    TrafficClass,
};

use super::{SimProcess, Yield};
use crate::deterministic::World;
use crate::feedback::RewardPolicy;

/// Salt for the traffic stream.
const TRAFFIC_STREAM: u64 = 0x7AFF;

/// Generates packets, routes them and feeds outcomes back.
///
/// Every routed packet goes through the delivery oracle with the shared
/// trust model. When learning is enabled each hop `(u, v)` of the path is
/// rewarded with the shaped outcome; the next-state neighbors are empty
/// once `v` is the destination.
#[derive(Debug)]
pub struct TrafficGenerator {
    strategy: Box<dyn RoutingStrategy>,
    config: TrafficConfig,
    reward: RewardPolicy,
    learning: bool,
    rng: DeterministicRng,
    flows: Option<Vec<(NodeId, NodeId)>>,
    generated: u64,
}

impl TrafficGenerator {
    /// Creates a generator routing with `algorithm`.
    ///
    /// The agent learns only from packets routed by the reinforcement
    /// strategy.
    pub fn new(
        algorithm: RoutingAlgorithm,
        agent: &AgentConfig,
        config: TrafficConfig,
        seed: u64,
    ) -> Self {
        Self::with_strategy(
            algorithm.build(agent),
            algorithm == RoutingAlgorithm::Reinforcement,
            config,
            seed,
        )
    }

    /// Creates a generator around an arbitrary strategy.
    pub fn with_strategy(
        strategy: Box<dyn RoutingStrategy>,
        learning: bool,
        config: TrafficConfig,
        seed: u64,
    ) -> Self {
        Self {
            strategy,
            config,
            reward: RewardPolicy::default(),
            learning,
            rng: DeterministicRng::derived(seed, TRAFFIC_STREAM),
            flows: None,
            generated: 0,
        }
    }

    /// Uses `reward` instead of the default negative-latency shaping.
    pub fn with_reward(mut self, reward: RewardPolicy) -> Self {
        self.reward = reward;
        self
    }

    /// Packets generated so far, including skipped ones.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    fn next_pair(&mut self, world: &World) -> Option<(NodeId, NodeId)> {
        match self.config.flows {
            FlowSelection::Pinned {
                source,
                destination,
            } => Some((source, destination)),
            FlowSelection::RandomPairs => self.rng.choose_pair(&world.network.node_ids()),
            FlowSelection::FixedFlows { count } => {
                if self.flows.is_none() {
                    let nodes = world.network.node_ids();
                    let flows: Vec<_> = (0..count.max(1))
                        .filter_map(|_| self.rng.choose_pair(&nodes))
                        .collect();
                    debug!(?flows, "sampled fixed flows");
                    self.flows = Some(flows);
                }
                let flows = self.flows.as_deref().unwrap_or_default();
                self.rng.choose(flows).copied()
            }
        }
    }

    fn next_class(&mut self) -> TrafficClass {
        if self.rng.random_bool(self.config.voice_fraction) {
            TrafficClass::Voice
        } else {
            TrafficClass::Data
        }
    }

    fn next_gap(&mut self) -> Duration {
        let min = self.config.min_gap.as_secs_f64();
        let max = self.config.max_gap.as_secs_f64();
        Duration::from_secs_f64(self.rng.random_range_f64(min, max.max(min)))
    }

    fn route(&mut self, now: Duration, world: &mut World, flow: Flow) {
        let algorithm = self.strategy.name();
        let path = {
            let mut ctx = RoutingContext::new(&world.network, &world.trust, &mut world.agent);
            self.strategy
                .find_path(&mut ctx, flow.source, flow.destination)
        };

        let Some(path) = path else {
            trace!(source = flow.source, destination = flow.destination, algorithm, "no path");
            world.stats.record_no_path(now, algorithm, flow);
            return;
        };

        let latency = world.network.path_latency(&path).unwrap_or_default();
        let outcome = world
            .network
            .deliver_packet(&path, Some(&mut world.trust), flow.class);

        if self.learning {
            let reward = self.reward.reward(&outcome, latency);
            for hop in path.windows(2) {
                let (state, action) = (hop[0], hop[1]);
                let next_neighbors = if action == flow.destination {
                    Vec::new()
                } else {
                    world.network.neighbors(action)
                };
                world
                    .agent
                    .learn(state, action, reward, action, &next_neighbors);
            }
        }

        world
            .stats
            .record_delivery(now, algorithm, flow, path, outcome, latency);
    }
}

impl SimProcess for TrafficGenerator {
    fn name(&self) -> &str {
        "traffic"
    }

    fn resume(&mut self, now: Duration, world: &mut World) -> Yield {
        loop {
            if self.generated >= self.config.packet_count {
                return Yield::Finish;
            }
            let Some((source, destination)) = self.next_pair(world) else {
                debug!("no flow can be formed, stopping traffic");
                return Yield::Finish;
            };
            let class = self.next_class();
            self.generated += 1;

            let excluded = self.config.exclude_adversary_endpoints
                && (world.network.is_adversary(source) || world.network.is_adversary(destination));
            if excluded {
                world.stats.record_skipped();
                continue;
            }

            self.route(now, world, Flow::new(source, destination, class));
            break;
        }

        if self.generated >= self.config.packet_count {
            Yield::Finish
        } else {
            Yield::After(self.next_gap())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustroute_core::config::TrustrouteConfig;
    use trustroute_core::{AttackKind, NetworkState, Topology};

    fn line_world() -> World {
        let topology = Topology::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        let config = TrustrouteConfig::deterministic_testing();
        let mut network = NetworkState::with_defaults(topology, 1);
        for node in 0..3 {
            network.set_reliability(node, 1.0).unwrap();
        }
        World::with_network(network, &config).unwrap()
    }

    fn pinned(packets: u64) -> TrafficConfig {
        TrafficConfig {
            packet_count: packets,
            flows: FlowSelection::Pinned {
                source: 0,
                destination: 2,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generates_configured_packet_count() {
        let mut world = line_world();
        let mut traffic = TrafficGenerator::new(
            RoutingAlgorithm::ShortestPath,
            &AgentConfig::default(),
            pinned(3),
            9,
        );

        let mut now = Duration::ZERO;
        let mut resumes = 0;
        while let Yield::After(gap) = traffic.resume(now, &mut world) {
            assert!(gap >= Duration::from_millis(100) && gap < Duration::from_millis(500));
            now += gap;
            resumes += 1;
        }
        assert_eq!(resumes, 2);
        assert_eq!(world.stats.attempted, 3);
        assert_eq!(world.stats.delivered, 3);
        assert_eq!(traffic.resume(now, &mut world), Yield::Finish);
    }

    #[test]
    fn test_excluded_endpoints_are_skipped() {
        let mut world = line_world();
        world
            .network
            .assign_adversary(2, AttackKind::Blackhole)
            .unwrap();
        let config = TrafficConfig {
            exclude_adversary_endpoints: true,
            ..pinned(5)
        };
        let mut traffic =
            TrafficGenerator::new(RoutingAlgorithm::HopCount, &AgentConfig::default(), config, 9);

        assert_eq!(traffic.resume(Duration::ZERO, &mut world), Yield::Finish);
        assert_eq!(world.stats.skipped, 5);
        assert_eq!(world.stats.attempted, 0);
    }

    #[test]
    fn test_drops_penalize_every_hop_for_learning_router() {
        let mut world = line_world();
        world
            .network
            .assign_adversary(1, AttackKind::Blackhole)
            .unwrap();
        // Node 0 has a single neighbor, so the walk is always [0, 1]
        let config = TrafficConfig {
            flows: FlowSelection::Pinned {
                source: 0,
                destination: 1,
            },
            ..pinned(1)
        };
        let mut traffic = TrafficGenerator::new(
            RoutingAlgorithm::Reinforcement,
            &AgentConfig::default(),
            config,
            9,
        );

        assert_eq!(traffic.resume(Duration::ZERO, &mut world), Yield::Finish);
        assert_eq!(world.stats.dropped, 1);
        assert_eq!(world.agent.q_value(0, 1), 0.1 * -100.0);
        assert!(world.agent.q_value(0, 1) < 0.0);
        assert!(world.trust.get_trust(1) < 1.0);
    }

    #[test]
    fn test_static_router_leaves_agent_untouched() {
        let mut world = line_world();
        let mut traffic = TrafficGenerator::new(
            RoutingAlgorithm::ShortestPath,
            &AgentConfig::default(),
            pinned(1),
            9,
        );
        traffic.resume(Duration::ZERO, &mut world);
        assert_eq!(world.agent.table_len(), 0);
    }
}
