//! Deterministic discrete-event orchestration.
//!
//! Processes share one simulated clock and a single [`World`]; the same
//! seed and process set always replay the same run.

mod clock;
mod events;
mod simulation;
mod state;
mod world;

// Re-export core types for public API
pub use clock::DeterministicClock;
pub use events::{ProcessId, ScheduledWake};
pub use simulation::{DeterministicSimulation, SimulationError, SimulationReport, StopReason};
pub use state::{ClassStats, PacketTrace, RunStatistics, TraceStatus};
pub use world::World;

#[cfg(test)]
mod tests;
