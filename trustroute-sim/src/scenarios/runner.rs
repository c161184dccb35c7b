//! Scenario runner and result collection.

use tracing::info;
use trustroute_core::{AttackKind, RoutingAlgorithm, TrustrouteConfig, TrustrouteError};

use super::builders::{ScenarioBuilder, SimulationScenarios};
use super::types::{
    AttackScenario, ComparisonScenario, QosScenario, ScenarioResult, ScenarioResults,
    TrainingResult, TrainingScenario,
};
use crate::deterministic::{SimulationError, SimulationReport};

/// Runs the standard experiments against one base configuration.
///
/// Every run rebuilds the topology from the same seed, so results within
/// one call are directly comparable.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: TrustrouteConfig,
}

impl ScenarioRunner {
    pub fn new(config: TrustrouteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrustrouteConfig {
        &self.config
    }

    /// Routes the same traffic with each algorithm.
    ///
    /// # Errors
    ///
    /// Propagates the first setup or scheduling failure.
    pub fn compare(
        &self,
        algorithms: &[RoutingAlgorithm],
        scenario: &ComparisonScenario,
    ) -> Result<ScenarioResults, SimulationError> {
        let mut results = ScenarioResults::new(self.config.topology.seed);
        for &algorithm in algorithms {
            let builder = SimulationScenarios::comparison(&self.config, algorithm, scenario);
            results.add_result(run(algorithm.as_str(), algorithm, builder)?);
        }
        Ok(results)
    }

    /// Mixed voice and data traffic over congested links.
    ///
    /// # Errors
    ///
    /// Propagates setup or scheduling failures.
    pub fn qos(
        &self,
        algorithm: RoutingAlgorithm,
        scenario: &QosScenario,
    ) -> Result<ScenarioResult, SimulationError> {
        let builder = SimulationScenarios::qos(&self.config, algorithm, scenario);
        run("qos", algorithm, builder)
    }

    /// One attack category against one routing algorithm.
    ///
    /// # Errors
    ///
    /// Propagates setup or scheduling failures.
    pub fn attack(
        &self,
        kind: AttackKind,
        algorithm: RoutingAlgorithm,
        scenario: &AttackScenario,
    ) -> Result<ScenarioResult, SimulationError> {
        let builder = SimulationScenarios::attack(&self.config, algorithm, kind, scenario);
        run(kind.as_str(), algorithm, builder)
    }

    /// Every attack category against one routing algorithm.
    ///
    /// # Errors
    ///
    /// Propagates the first setup or scheduling failure.
    pub fn attack_all(
        &self,
        algorithm: RoutingAlgorithm,
        scenario: &AttackScenario,
    ) -> Result<ScenarioResults, SimulationError> {
        let mut results = ScenarioResults::new(self.config.topology.seed);
        for kind in [
            AttackKind::Blackhole,
            AttackKind::grayhole(),
            AttackKind::on_off(),
        ] {
            results.add_result(self.attack(kind, algorithm, scenario)?);
        }
        Ok(results)
    }

    /// Trains the reinforcement agent, then exploits the learned table.
    ///
    /// Both phases route around the scenario's unreliable nodes. The
    /// exploitation phase continues on the same world: network state,
    /// trust and Q-table carry over while statistics start fresh. Its
    /// traffic is drawn from a different stream than training traffic.
    ///
    /// # Errors
    ///
    /// - `SimulationError::Setup` - An epsilon outside [0, 1]
    /// - Any setup or scheduling failure of either phase
    pub fn train(&self, scenario: &TrainingScenario) -> Result<TrainingResult, SimulationError> {
        let mut sim = SimulationScenarios::training(&self.config, scenario).build()?;
        let training = sim.run()?;

        let mut world = sim.into_world();
        let learned_pairs = world.agent.table_len();
        world.stats.reset();
        world
            .agent
            .set_epsilon(scenario.exploitation_epsilon)
            .map_err(TrustrouteError::from)?;

        let mut exploitation_config = self.config.clone();
        exploitation_config.topology.seed = self.config.topology.seed.wrapping_add(1);
        exploitation_config.traffic.packet_count = scenario.exploitation_packets;

        let mut sim = ScenarioBuilder::new(exploitation_config)
            .algorithm(RoutingAlgorithm::Reinforcement)
            .build_with_world(world)?;
        let exploitation = sim.run()?;

        info!(
            learned_pairs,
            training_ratio = training.statistics.delivery_ratio(),
            exploitation_ratio = exploitation.statistics.delivery_ratio(),
            "training finished"
        );
        Ok(TrainingResult {
            training,
            exploitation,
            learned_pairs,
        })
    }
}

fn run(
    label: &str,
    algorithm: RoutingAlgorithm,
    builder: ScenarioBuilder,
) -> Result<ScenarioResult, SimulationError> {
    let mut sim = builder.build()?;
    let report: SimulationReport = sim.run()?;
    info!(
        label,
        %algorithm,
        delivered = report.statistics.delivered,
        attempted = report.statistics.attempted,
        "scenario finished"
    );
    Ok(ScenarioResult {
        label: label.to_string(),
        algorithm,
        report,
    })
}
