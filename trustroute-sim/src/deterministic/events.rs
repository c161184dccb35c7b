//! Scheduled process wakes and their ordering.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

/// Handle of a process registered with the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub(crate) usize);

impl ProcessId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process-{}", self.0)
    }
}

/// A pending resumption of one process.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledWake {
    /// Insertion counter, breaks ties between equal times
    pub sequence: u64,
    /// Simulation time of the resumption
    pub time: Duration,
    pub process: ProcessId,
}

impl ScheduledWake {
    pub fn new(sequence: u64, time: Duration, process: ProcessId) -> Self {
        Self {
            sequence,
            time,
            process,
        }
    }
}

impl Eq for ScheduledWake {}

impl PartialEq for ScheduledWake {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Ord for ScheduledWake {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the earliest wake, then the oldest insertion
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for ScheduledWake {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
