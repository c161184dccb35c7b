//! Core discrete-event engine.

use std::collections::BinaryHeap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use trustroute_core::config::SimulationConfig;
use trustroute_core::{NetworkError, TrustrouteError};

use super::clock::DeterministicClock;
use super::events::{ProcessId, ScheduledWake};
use super::state::RunStatistics;
use super::world::World;
use crate::processes::{SimProcess, Yield};

/// Errors that can occur during simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Event queue exceeded maximum capacity
    #[error("Event queue overflow: {count} wakes scheduled")]
    EventQueueOverflow { count: usize },

    /// A wake could not be scheduled consistently
    #[error("Invalid event scheduling: {reason}")]
    InvalidEventScheduling { reason: String },

    /// Scenario setup rejected by the network model
    #[error("Scenario setup failed: {0}")]
    Network(#[from] NetworkError),

    /// Scenario setup rejected by a core component
    #[error("Scenario setup failed: {0}")]
    Setup(#[from] TrustrouteError),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Every non-daemon process finished
    ProcessesFinished,
    /// The next wake lies beyond the time limit
    TimeLimit,
    /// The configured number of routed packets was reached
    PacketBudget,
    /// Nothing left to schedule
    QueueDrained,
}

/// Result of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Seed used for reproduction
    pub seed: u64,
    /// Simulated time when the run stopped
    pub duration: Duration,
    /// Process resumptions executed
    pub wakes_processed: u64,
    pub stop_reason: StopReason,
    pub statistics: RunStatistics,
}

impl SimulationReport {
    /// Generates human-readable summary.
    pub fn summary(&self) -> String {
        let stats = &self.statistics;
        let mut summary = String::new();
        summary.push_str(&format!("Simulation Report (seed: {})\n", self.seed));
        summary.push_str(&format!(
            "Simulated time: {:.2}s ({:?})\n",
            self.duration.as_secs_f64(),
            self.stop_reason
        ));
        summary.push_str(&format!(
            "Packets: {} attempted, {} delivered, {} dropped, {} without path",
            stats.attempted, stats.delivered, stats.dropped, stats.no_path
        ));
        if stats.skipped > 0 {
            summary.push_str(&format!(", {} skipped", stats.skipped));
        }
        summary.push_str(&format!(
            "\nDelivery ratio: {:.1}%\n",
            stats.delivery_ratio() * 100.0
        ));

        for (class, class_stats) in &stats.per_class {
            summary.push_str(&format!(
                "  {class}: {}/{} ({:.1}%)\n",
                class_stats.delivered,
                class_stats.attempted,
                class_stats.delivery_ratio() * 100.0
            ));
        }

        match stats.mean_latency() {
            Some(latency) => summary.push_str(&format!("Mean path latency: {latency:.2}\n")),
            None => summary.push_str("Mean path latency: n/a\n"),
        }

        if !stats.drops_by_node.is_empty() {
            summary.push_str("Drops by node:\n");
            for (node, count) in &stats.drops_by_node {
                summary.push_str(&format!("  node {node}: {count}\n"));
            }
        }

        summary
    }
}

struct ProcessSlot {
    process: Box<dyn SimProcess>,
    finished: bool,
}

/// Deterministic orchestrator interleaving processes on a simulated clock.
///
/// Wakes are ordered by time, then by insertion. A process is resumed with
/// exclusive access to the [`World`] and runs until it yields.
pub struct DeterministicSimulation {
    config: SimulationConfig,
    seed: u64,
    clock: DeterministicClock,
    queue: BinaryHeap<ScheduledWake>,
    next_sequence: u64,
    processes: Vec<ProcessSlot>,
    foreground_spawned: usize,
    foreground_live: usize,
    packet_budget: Option<u64>,
    wakes_processed: u64,
    world: World,
}

impl DeterministicSimulation {
    /// Creates an engine over `world`.
    pub fn new(world: World, config: SimulationConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            clock: DeterministicClock::new(),
            queue: BinaryHeap::new(),
            next_sequence: 0,
            processes: Vec::new(),
            foreground_spawned: 0,
            foreground_live: 0,
            packet_budget: None,
            wakes_processed: 0,
            world,
        }
    }

    /// Stops the run once this many packets have been routed.
    pub fn with_packet_budget(mut self, budget: u64) -> Self {
        self.packet_budget = Some(budget);
        self
    }

    /// Registers a process first resumed at the current time.
    ///
    /// # Errors
    ///
    /// - `SimulationError::EventQueueOverflow` - Event queue is full
    pub fn spawn(&mut self, process: Box<dyn SimProcess>) -> Result<ProcessId, SimulationError> {
        self.spawn_after(Duration::ZERO, process)
    }

    /// Registers a process first resumed after `delay`.
    ///
    /// # Errors
    ///
    /// - `SimulationError::EventQueueOverflow` - Event queue is full
    pub fn spawn_after(
        &mut self,
        delay: Duration,
        process: Box<dyn SimProcess>,
    ) -> Result<ProcessId, SimulationError> {
        let id = ProcessId(self.processes.len());
        self.schedule(id, self.clock.now() + delay)?;

        debug!(%id, name = process.name(), daemon = process.is_daemon(), "process spawned");
        if !process.is_daemon() {
            self.foreground_spawned += 1;
            self.foreground_live += 1;
        }
        self.processes.push(ProcessSlot {
            process,
            finished: false,
        });
        Ok(id)
    }

    fn schedule(&mut self, process: ProcessId, time: Duration) -> Result<(), SimulationError> {
        if self.queue.len() >= self.config.event_queue_capacity {
            return Err(SimulationError::EventQueueOverflow {
                count: self.queue.len(),
            });
        }
        self.queue
            .push(ScheduledWake::new(self.next_sequence, time, process));
        self.next_sequence += 1;
        Ok(())
    }

    /// Runs until the configured time limit or an earlier stop condition.
    ///
    /// # Errors
    ///
    /// - `SimulationError::EventQueueOverflow` - A process rescheduled into a full queue
    /// - `SimulationError::InvalidEventScheduling` - Clock would move backwards
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        self.run_until(self.config.max_time)
    }

    /// Runs for `duration` of simulated time from now.
    ///
    /// # Errors
    ///
    /// Same as [`DeterministicSimulation::run`].
    pub fn run_for(&mut self, duration: Duration) -> Result<SimulationReport, SimulationError> {
        let deadline = (self.clock.now() + duration).min(self.config.max_time);
        self.run_until(deadline)
    }

    fn run_until(&mut self, deadline: Duration) -> Result<SimulationReport, SimulationError> {
        info!(
            seed = self.seed,
            processes = self.processes.len(),
            ?deadline,
            "simulation starting"
        );

        let stop_reason = loop {
            if self.foreground_spawned > 0 && self.foreground_live == 0 {
                break StopReason::ProcessesFinished;
            }
            if self
                .packet_budget
                .is_some_and(|budget| self.world.stats.attempted >= budget)
            {
                break StopReason::PacketBudget;
            }
            let Some(wake) = self.queue.peek().copied() else {
                break StopReason::QueueDrained;
            };
            if wake.time > deadline {
                break StopReason::TimeLimit;
            }
            self.queue.pop();

            self.clock.advance_to(wake.time)?;
            self.resume(wake)?;
        };

        info!(
            ?stop_reason,
            elapsed = ?self.clock.now(),
            attempted = self.world.stats.attempted,
            delivered = self.world.stats.delivered,
            "simulation finished"
        );
        Ok(self.generate_report(stop_reason))
    }

    fn resume(&mut self, wake: ScheduledWake) -> Result<(), SimulationError> {
        let now = self.clock.now();
        let Some(slot) = self.processes.get_mut(wake.process.index()) else {
            return Err(SimulationError::InvalidEventScheduling {
                reason: format!("wake for unknown {}", wake.process),
            });
        };
        if slot.finished {
            return Ok(());
        }

        self.wakes_processed += 1;
        match slot.process.resume(now, &mut self.world) {
            Yield::After(delay) => self.schedule(wake.process, now + delay),
            Yield::Finish => {
                slot.finished = true;
                debug!(process = %wake.process, name = slot.process.name(), ?now, "process finished");
                if !slot.process.is_daemon() {
                    self.foreground_live = self.foreground_live.saturating_sub(1);
                }
                Ok(())
            }
        }
    }

    fn generate_report(&self, stop_reason: StopReason) -> SimulationReport {
        SimulationReport {
            seed: self.seed,
            duration: self.clock.now(),
            wakes_processed: self.wakes_processed,
            stop_reason,
            statistics: self.world.stats.clone(),
        }
    }

    /// Returns the seed used for this simulation.
    pub fn simulation_seed(&self) -> u64 {
        self.seed
    }

    /// Current simulation time.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Number of wakes waiting in the queue.
    pub fn pending_wakes(&self) -> usize {
        self.queue.len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Ends the run and hands back the shared state.
    pub fn into_world(self) -> World {
        self.world
    }
}

impl std::fmt::Debug for DeterministicSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeterministicSimulation")
            .field("seed", &self.seed)
            .field("now", &self.clock.now())
            .field("processes", &self.processes.len())
            .field("pending_wakes", &self.queue.len())
            .finish_non_exhaustive()
    }
}
