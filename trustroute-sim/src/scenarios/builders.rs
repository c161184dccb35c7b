//! Scenario assembly.

use tracing::{info, warn};
use trustroute_core::config::{FlowSelection, TrustrouteConfig};
use trustroute_core::{AttackKind, NetworkState, NodeId, RoutingAlgorithm};

use super::types::{AttackScenario, ComparisonScenario, QosScenario, TrainingScenario};
use crate::deterministic::{DeterministicSimulation, SimulationError, World};
use crate::feedback::RewardPolicy;
use crate::processes::{AdversaryCycle, CongestionProcess, TrafficGenerator};

/// Assembles a simulation: network, node roles and processes.
///
/// Roles naming nodes absent from the topology are skipped with a warning.
#[derive(Debug)]
pub struct ScenarioBuilder {
    config: TrustrouteConfig,
    algorithm: RoutingAlgorithm,
    network: Option<NetworkState>,
    reliability: Vec<(NodeId, f64)>,
    adversaries: Vec<(NodeId, AttackKind)>,
    uniform_congestion: Option<f64>,
    congestion_process: bool,
    reward: RewardPolicy,
    packet_budget: Option<u64>,
}

impl ScenarioBuilder {
    pub fn new(config: TrustrouteConfig) -> Self {
        Self {
            config,
            algorithm: RoutingAlgorithm::ShortestPath,
            network: None,
            reliability: Vec::new(),
            adversaries: Vec::new(),
            uniform_congestion: None,
            congestion_process: true,
            reward: RewardPolicy::default(),
            packet_budget: None,
        }
    }

    pub fn config(&self) -> &TrustrouteConfig {
        &self.config
    }

    pub fn algorithm(mut self, algorithm: RoutingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Uses a prepared network instead of generating one from the config.
    pub fn network(mut self, network: NetworkState) -> Self {
        self.network = Some(network);
        self
    }

    pub fn node_reliability(mut self, node: NodeId, reliability: f64) -> Self {
        self.reliability.push((node, reliability));
        self
    }

    pub fn adversary(mut self, node: NodeId, kind: AttackKind) -> Self {
        self.adversaries.push((node, kind));
        self
    }

    /// Sets every link to `level` before the run starts.
    pub fn uniform_congestion(mut self, level: f64) -> Self {
        self.uniform_congestion = Some(level);
        self
    }

    /// Keeps congestion fixed for the whole run.
    pub fn without_congestion_process(mut self) -> Self {
        self.congestion_process = false;
        self
    }

    pub fn reward(mut self, reward: RewardPolicy) -> Self {
        self.reward = reward;
        self
    }

    pub fn packet_budget(mut self, budget: u64) -> Self {
        self.packet_budget = Some(budget);
        self
    }

    /// Builds the world with all node roles applied.
    ///
    /// # Errors
    ///
    /// - `SimulationError::Network` - Invalid topology, reliability or congestion
    /// - `SimulationError::Setup` - Invalid trust or agent parameters
    pub fn build_world(&mut self) -> Result<World, SimulationError> {
        let mut network = match self.network.take() {
            Some(network) => network,
            None => NetworkState::from_config(&self.config)?,
        };

        for &(node, reliability) in &self.reliability {
            if !network.contains(node) {
                warn!(node, "skipping reliability override for missing node");
                continue;
            }
            network.set_reliability(node, reliability)?;
        }
        for &(node, kind) in &self.adversaries {
            if !network.contains(node) {
                warn!(node, %kind, "skipping adversary for missing node");
                continue;
            }
            network.assign_adversary(node, kind)?;
        }
        if let Some(level) = self.uniform_congestion {
            network.set_uniform_congestion(level)?;
        }

        Ok(World::with_network(network, &self.config)?)
    }

    /// Builds the world and spawns congestion, adversary and traffic processes.
    ///
    /// # Errors
    ///
    /// Same as [`ScenarioBuilder::build_world`], plus
    /// `SimulationError::EventQueueOverflow` if the queue cannot hold the processes.
    pub fn build(mut self) -> Result<DeterministicSimulation, SimulationError> {
        let world = self.build_world()?;
        self.build_with_world(world)
    }

    /// Spawns this scenario's processes over an existing world.
    ///
    /// Node roles configured on the builder are not re-applied.
    ///
    /// # Errors
    ///
    /// - `SimulationError::EventQueueOverflow` - The queue cannot hold the processes
    pub fn build_with_world(self, world: World) -> Result<DeterministicSimulation, SimulationError> {
        let seed = self.config.topology.seed;
        let adversaries: Vec<NodeId> = world.network.adversaries().map(|a| a.node()).collect();
        let mut sim = DeterministicSimulation::new(world, self.config.simulation.clone(), seed);
        if let Some(budget) = self.packet_budget {
            sim = sim.with_packet_budget(budget);
        }

        // Adversaries first so a phase switch precedes traffic at the same instant
        for node in adversaries {
            sim.spawn(Box::new(AdversaryCycle::new(node)))?;
        }
        if self.congestion_process {
            sim.spawn(Box::new(CongestionProcess::new(self.config.congestion.tick)))?;
        }
        let traffic = TrafficGenerator::new(
            self.algorithm,
            &self.config.agent,
            self.config.traffic.clone(),
            seed,
        )
        .with_reward(self.reward);
        sim.spawn(Box::new(traffic))?;

        info!(
            algorithm = %self.algorithm,
            seed,
            packets = self.config.traffic.packet_count,
            "scenario assembled"
        );
        Ok(sim)
    }
}

/// Pre-built scenarios reproducing the standard experiments.
pub struct SimulationScenarios;

impl SimulationScenarios {
    /// Same seeded topology with a few unreliable nodes.
    pub fn comparison(
        config: &TrustrouteConfig,
        algorithm: RoutingAlgorithm,
        scenario: &ComparisonScenario,
    ) -> ScenarioBuilder {
        let mut config = config.clone();
        config.traffic.packet_count = scenario.packets;

        scenario.unreliable_nodes.iter().fold(
            ScenarioBuilder::new(config).algorithm(algorithm),
            |builder, &node| builder.node_reliability(node, scenario.unreliable_reliability),
        )
    }

    /// Exploratory reinforcement routing over a few unreliable nodes.
    pub fn training(config: &TrustrouteConfig, scenario: &TrainingScenario) -> ScenarioBuilder {
        let mut config = config.clone();
        config.agent.epsilon = scenario.training_epsilon;
        config.traffic.packet_count = scenario.training_packets;

        scenario.unreliable_nodes.iter().fold(
            ScenarioBuilder::new(config).algorithm(RoutingAlgorithm::Reinforcement),
            |builder, &node| builder.node_reliability(node, scenario.unreliable_reliability),
        )
    }

    /// Voice and data sharing heavily congested links.
    pub fn qos(
        config: &TrustrouteConfig,
        algorithm: RoutingAlgorithm,
        scenario: &QosScenario,
    ) -> ScenarioBuilder {
        let mut config = config.clone();
        config.topology.density = scenario.density;
        config.congestion.baseline = scenario.congestion_baseline;
        config.traffic.packet_count = scenario.packets;
        config.traffic.voice_fraction = scenario.voice_fraction;
        config.traffic.min_gap = scenario.gap;
        config.traffic.max_gap = scenario.gap;
        config.traffic.flows = FlowSelection::RandomPairs;

        ScenarioBuilder::new(config)
            .algorithm(algorithm)
            .uniform_congestion(scenario.congestion_baseline)
    }

    /// Malicious nodes of one category; adversary endpoints are excluded.
    pub fn attack(
        config: &TrustrouteConfig,
        algorithm: RoutingAlgorithm,
        kind: AttackKind,
        scenario: &AttackScenario,
    ) -> ScenarioBuilder {
        let mut config = config.clone();
        config.topology.density = scenario.density;
        config.traffic.packet_count = scenario.packets;
        config.traffic.min_gap = scenario.gap;
        config.traffic.max_gap = scenario.gap;
        config.traffic.flows = FlowSelection::RandomPairs;
        config.traffic.exclude_adversary_endpoints = true;

        scenario.adversaries.iter().fold(
            ScenarioBuilder::new(config).algorithm(algorithm),
            |builder, &node| builder.adversary(node, kind),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FAILURE_PENALTY;

    #[test]
    fn test_comparison_marks_unreliable_nodes() {
        let config = TrustrouteConfig::default();
        let mut builder = SimulationScenarios::comparison(
            &config,
            RoutingAlgorithm::TrustWeighted,
            &ComparisonScenario::default(),
        );
        let world = builder.build_world().unwrap();

        assert_eq!(world.network.reliability(3), Some(0.6));
        assert_eq!(world.network.reliability(7), Some(0.6));
        assert_eq!(world.network.reliability(0), Some(0.98));
    }

    #[test]
    fn test_training_marks_unreliable_nodes() {
        let config = TrustrouteConfig::default();
        let mut builder = SimulationScenarios::training(&config, &TrainingScenario::default());
        let world = builder.build_world().unwrap();

        assert_eq!(world.network.reliability(3), Some(0.6));
        assert_eq!(world.network.reliability(7), Some(0.6));
        assert_eq!(world.agent.epsilon(), 0.5);
    }

    #[test]
    fn test_training_penalizes_hops_into_dead_nodes() {
        let mut config = TrustrouteConfig::default();
        config.topology.density = 0.3;
        let scenario = TrainingScenario {
            unreliable_reliability: 0.0,
            training_packets: 300,
            ..Default::default()
        };
        let mut sim = SimulationScenarios::training(&config, &scenario)
            .build()
            .unwrap();
        sim.run().unwrap();
        let world = sim.into_world();

        // Every update into a dead node targets at most the failure penalty
        let mut learned = 0;
        for &dead in &scenario.unreliable_nodes {
            for from in world.network.neighbors(dead) {
                let q = world.agent.q_value(from, dead);
                if q != 0.0 {
                    learned += 1;
                    assert!(q <= 0.1 * FAILURE_PENALTY + 1e-9, "Q({from},{dead}) = {q}");
                }
            }
        }
        assert!(learned > 0);
    }

    #[test]
    fn test_missing_nodes_are_skipped() {
        let mut config = TrustrouteConfig::default();
        config.topology.num_nodes = 4;
        let mut builder = SimulationScenarios::attack(
            &config,
            RoutingAlgorithm::HopCount,
            AttackKind::Blackhole,
            &AttackScenario::default(),
        );
        let world = builder.build_world().unwrap();
        assert_eq!(world.network.adversaries().count(), 0);
    }

    #[test]
    fn test_invalid_reliability_is_rejected() {
        let mut builder =
            ScenarioBuilder::new(TrustrouteConfig::default()).node_reliability(0, 1.5);
        assert!(matches!(
            builder.build_world(),
            Err(SimulationError::Network(_))
        ));
    }

    #[test]
    fn test_qos_starts_congested() {
        let config = TrustrouteConfig::default();
        let mut builder =
            SimulationScenarios::qos(&config, RoutingAlgorithm::ShortestPath, &QosScenario::default());
        assert_eq!(builder.config().traffic.packet_count, 200);

        let world = builder.build_world().unwrap();
        for (_, link) in world.network.topology().links() {
            assert_eq!(link.congestion, 0.7);
        }
    }
}
