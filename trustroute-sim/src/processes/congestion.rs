use std::time::Duration;

use tracing::trace;

use super::{SimProcess, Yield};
use crate::deterministic::World;

/// Background process evolving link congestion once per tick.
#[derive(Debug, Clone)]
pub struct CongestionProcess {
    tick: Duration,
    ticks: u64,
}

impl CongestionProcess {
    /// Creates a process waking every `tick` (at least one millisecond).
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl SimProcess for CongestionProcess {
    fn name(&self) -> &str {
        "congestion"
    }

    fn is_daemon(&self) -> bool {
        true
    }

    fn resume(&mut self, now: Duration, world: &mut World) -> Yield {
        let mean = world.network.evolve_congestion();
        self.ticks += 1;
        trace!(?now, mean, tick = self.ticks, "congestion tick");
        Yield::After(self.tick)
    }
}
