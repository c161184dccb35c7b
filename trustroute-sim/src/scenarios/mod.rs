//! Pre-built routing experiments.
//!
//! Each scenario configures topology, node roles and traffic, then runs the
//! deterministic orchestrator over it.

pub mod builders;
pub mod runner;
pub mod types;

// Re-export main types
pub use builders::{ScenarioBuilder, SimulationScenarios};
pub use runner::ScenarioRunner;
pub use types::{
    AttackScenario, ComparisonScenario, QosScenario, ScenarioResult, ScenarioResults,
    TrainingResult, TrainingScenario,
};
