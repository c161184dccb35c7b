//! Reward shaping for the Q-routing agent.

use serde::Serialize;
use trustroute_core::DeliveryOutcome;

/// Reward given to every hop of a path whose packet was lost.
pub const FAILURE_PENALTY: f64 = -100.0;

/// Maps a delivery outcome to the scalar reward fed to the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewardPolicy {
    /// Negative path latency on delivery
    #[default]
    NegativeLatency,
    /// Negative hop count on delivery
    NegativeHopCount,
}

impl RewardPolicy {
    /// Reward for a path with total link weight `latency`.
    pub fn reward(self, outcome: &DeliveryOutcome, latency: f64) -> f64 {
        match (self, outcome) {
            (RewardPolicy::NegativeLatency, DeliveryOutcome::Delivered { .. }) => -latency,
            (RewardPolicy::NegativeHopCount, DeliveryOutcome::Delivered { hops }) => {
                -(*hops as f64)
            }
            (_, DeliveryOutcome::Dropped { .. } | DeliveryOutcome::EmptyPath) => FAILURE_PENALTY,
        }
    }
}
