//! Scenario parameters and results.

use std::time::Duration;

use serde::Serialize;
use trustroute_core::{NodeId, RoutingAlgorithm};

use crate::deterministic::SimulationReport;

/// Strategy comparison over a topology with unreliable nodes.
#[derive(Debug, Clone)]
pub struct ComparisonScenario {
    pub unreliable_nodes: Vec<NodeId>,
    pub unreliable_reliability: f64,
    pub packets: u64,
}

impl Default for ComparisonScenario {
    fn default() -> Self {
        Self {
            unreliable_nodes: vec![3, 7],
            unreliable_reliability: 0.6,
            packets: 50,
        }
    }
}

/// Mixed voice/data traffic over a congested network.
#[derive(Debug, Clone)]
pub struct QosScenario {
    pub density: f64,
    pub packets: u64,
    pub gap: Duration,
    pub voice_fraction: f64,
    /// Congestion level links start at and revert toward
    pub congestion_baseline: f64,
}

impl Default for QosScenario {
    fn default() -> Self {
        Self {
            density: 0.3,
            packets: 200,
            gap: Duration::from_millis(100),
            voice_fraction: 0.5,
            congestion_baseline: 0.7,
        }
    }
}

/// Malicious nodes under one attack category.
#[derive(Debug, Clone)]
pub struct AttackScenario {
    pub adversaries: Vec<NodeId>,
    pub density: f64,
    pub packets: u64,
    pub gap: Duration,
}

impl Default for AttackScenario {
    fn default() -> Self {
        Self {
            adversaries: vec![5, 9],
            density: 0.3,
            packets: 200,
            gap: Duration::from_millis(100),
        }
    }
}

/// Exploratory training followed by exploitation with the learned table.
#[derive(Debug, Clone)]
pub struct TrainingScenario {
    /// Nodes degraded for both phases
    pub unreliable_nodes: Vec<NodeId>,
    pub unreliable_reliability: f64,
    pub training_epsilon: f64,
    pub training_packets: u64,
    pub exploitation_epsilon: f64,
    pub exploitation_packets: u64,
}

impl Default for TrainingScenario {
    fn default() -> Self {
        Self {
            unreliable_nodes: vec![3, 7],
            unreliable_reliability: 0.6,
            training_epsilon: 0.5,
            training_packets: 500,
            exploitation_epsilon: 0.05,
            exploitation_packets: 50,
        }
    }
}

/// One labelled run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub label: String,
    pub algorithm: RoutingAlgorithm,
    pub report: SimulationReport,
}

impl ScenarioResult {
    pub fn delivery_ratio(&self) -> f64 {
        self.report.statistics.delivery_ratio()
    }
}

/// Runs sharing a seed, compared side by side.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResults {
    pub seed: u64,
    pub results: Vec<ScenarioResult>,
}

impl ScenarioResults {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    pub fn get(&self, label: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|result| result.label == label)
    }

    /// Run with the highest delivery ratio, first one on ties.
    pub fn best(&self) -> Option<&ScenarioResult> {
        self.results.iter().fold(None, |best, result| match best {
            Some(current) if current.delivery_ratio() >= result.delivery_ratio() => Some(current),
            _ => Some(result),
        })
    }

    /// One line per run.
    pub fn summary(&self) -> String {
        let mut summary = format!("Comparison (seed: {})\n", self.seed);
        for result in &self.results {
            let stats = &result.report.statistics;
            let latency = stats
                .mean_latency()
                .map_or_else(|| "n/a".to_string(), |l| format!("{l:.2}"));
            summary.push_str(&format!(
                "  {:<16} delivered {:>4}/{:<4} ({:>5.1}%)  no-path {:>3}  latency {}\n",
                result.label,
                stats.delivered,
                stats.attempted,
                result.delivery_ratio() * 100.0,
                stats.no_path,
                latency
            ));
        }
        summary
    }
}

/// Reports of both learning phases.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingResult {
    pub training: SimulationReport,
    pub exploitation: SimulationReport,
    /// Visited (state, action) pairs after training
    pub learned_pairs: usize,
}

impl TrainingResult {
    pub fn summary(&self) -> String {
        format!(
            "Training phase\n{}\nExploitation phase\n{}\nLearned pairs: {}\n",
            self.training.summary(),
            self.exploitation.summary(),
            self.learned_pairs
        )
    }
}
