//! Trustroute Simulation - Deterministic experiments over the routing models.

#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
//!
//! Routing experiments run as cooperating processes on one simulated clock:
//! a traffic generator routes packets and feeds outcomes back, a congestion
//! process perturbs link loads, and adversary cycles switch on-off attackers
//! between phases.
//!
//! # Example
//!
//! ```rust,no_run
//! use trustroute_core::{RoutingAlgorithm, TrustrouteConfig};
//! use trustroute_sim::{ComparisonScenario, ScenarioRunner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = ScenarioRunner::new(TrustrouteConfig::default());
//! let results = runner.compare(&RoutingAlgorithm::ALL, &ComparisonScenario::default())?;
//! println!("{}", results.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Deterministic Engine**: wake queue ordered by time then insertion
//! - **Processes**: traffic, congestion and adversary behavior
//! - **Feedback**: reward shaping for the Q-routing agent
//! - **Scenario Library**: comparison, QoS, attack and training runs

pub mod deterministic;
pub mod feedback;
pub mod processes;
pub mod scenarios;

pub use deterministic::{
    ClassStats, DeterministicClock, DeterministicSimulation, PacketTrace, ProcessId,
    RunStatistics, SimulationError, SimulationReport, StopReason, TraceStatus, World,
};
pub use feedback::{FAILURE_PENALTY, RewardPolicy};
pub use processes::{AdversaryCycle, CongestionProcess, SimProcess, TrafficGenerator, Yield};
pub use scenarios::{
    AttackScenario, ComparisonScenario, QosScenario, ScenarioBuilder, ScenarioResult,
    ScenarioResults, ScenarioRunner, SimulationScenarios, TrainingResult, TrainingScenario,
};

/// Common simulation error type for convenience.
pub type Result<T> = std::result::Result<T, SimulationError>;
