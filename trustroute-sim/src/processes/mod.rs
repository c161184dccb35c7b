//! Logical processes interleaved by the orchestrator.
//!
//! A process runs one unit of work per resumption and then either asks to
//! be woken again after a simulated delay or finishes.

mod adversary;
mod congestion;
mod traffic;

use std::fmt;
use std::time::Duration;

pub use adversary::AdversaryCycle;
pub use congestion::CongestionProcess;
pub use traffic::TrafficGenerator;

use crate::deterministic::World;

/// What a process wants after a resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yield {
    /// Resume again once this much simulated time has passed
    After(Duration),
    /// Never resume again
    Finish,
}

/// A cooperatively scheduled simulation process.
pub trait SimProcess: fmt::Debug {
    /// Label for logs.
    fn name(&self) -> &str;

    /// Daemons run in the background and do not keep a run alive.
    fn is_daemon(&self) -> bool {
        false
    }

    /// Performs one unit of work at simulation time `now`.
    fn resume(&mut self, now: Duration, world: &mut World) -> Yield;
}
