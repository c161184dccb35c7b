use std::time::Duration;

use tracing::debug;
use trustroute_core::{BehaviorState, NodeId};

use super::{SimProcess, Yield};
use crate::deterministic::World;

/// Drives one adversary's good/bad cycle.
///
/// Starts in the good phase. On-off adversaries alternate phases after
/// their dwell times; static attacks idle on a long recheck interval.
/// Finishes if the node stops being an adversary.
#[derive(Debug, Clone)]
pub struct AdversaryCycle {
    node: NodeId,
    name: String,
    next_state: BehaviorState,
}

impl AdversaryCycle {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            name: format!("adversary-{node}"),
            next_state: BehaviorState::Good,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl SimProcess for AdversaryCycle {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_daemon(&self) -> bool {
        true
    }

    fn resume(&mut self, now: Duration, world: &mut World) -> Yield {
        let Some(adversary) = world.network.adversary_mut(self.node) else {
            debug!(node = self.node, ?now, "adversary role removed, stopping cycle");
            return Yield::Finish;
        };

        let dwell = adversary.enter_state(self.next_state);
        if adversary.kind().is_time_varying() {
            self.next_state = self.next_state.toggled();
        }
        Yield::After(dwell)
    }
}
