//! Malicious forwarding behavior attached to individual nodes.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::network::NodeId;
use crate::traffic::TrafficClass;

/// Idle interval for attacks whose verdict never changes.
pub const STATIC_ATTACK_RECHECK: Duration = Duration::from_secs(100);

/// Default time an on-off adversary spends forwarding honestly.
pub const DEFAULT_GOOD_DWELL: Duration = Duration::from_secs(20);

/// Default time an on-off adversary spends dropping.
pub const DEFAULT_BAD_DWELL: Duration = Duration::from_secs(5);

/// Attack category of a malicious node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AttackKind {
    /// Drops every packet
    Blackhole,
    /// Drops only the targeted class, forwards the rest
    Grayhole { target: TrafficClass },
    /// Alternates honest and dropping phases on a fixed schedule
    OnOff {
        good_dwell: Duration,
        bad_dwell: Duration,
    },
}

impl AttackKind {
    /// Grayhole targeting low-priority data.
    pub fn grayhole() -> Self {
        AttackKind::Grayhole {
            target: TrafficClass::Data,
        }
    }

    /// On-off with the default 20/5 dwell schedule.
    pub fn on_off() -> Self {
        AttackKind::OnOff {
            good_dwell: DEFAULT_GOOD_DWELL,
            bad_dwell: DEFAULT_BAD_DWELL,
        }
    }

    /// Whether the verdict depends on the good/bad state.
    pub fn is_time_varying(&self) -> bool {
        matches!(self, AttackKind::OnOff { .. })
    }

    /// Returns string representation for traces and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackKind::Blackhole => "blackhole",
            AttackKind::Grayhole { .. } => "grayhole",
            AttackKind::OnOff { .. } => "on-off",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavior phase of a time-varying adversary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorState {
    Good,
    Bad,
}

impl BehaviorState {
    /// The other phase.
    pub fn toggled(self) -> Self {
        match self {
            BehaviorState::Good => BehaviorState::Bad,
            BehaviorState::Bad => BehaviorState::Good,
        }
    }
}

/// Forwarding decision for a single packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Forward,
    Drop,
}

/// Per-node malicious behavior state machine.
#[derive(Debug, Clone, Serialize)]
pub struct Adversary {
    node: NodeId,
    kind: AttackKind,
    state: BehaviorState,
    active: bool,
}

impl Adversary {
    /// Creates an active adversary starting in the good phase.
    pub fn new(node: NodeId, kind: AttackKind) -> Self {
        Self {
            node,
            kind,
            state: BehaviorState::Good,
            active: true,
        }
    }

    /// Decides whether a packet of `class` is forwarded.
    pub fn process_packet(&self, class: TrafficClass) -> Verdict {
        if !self.active {
            return Verdict::Forward;
        }

        match self.kind {
            AttackKind::Blackhole => Verdict::Drop,
            AttackKind::Grayhole { target } if class == target => Verdict::Drop,
            AttackKind::Grayhole { .. } => Verdict::Forward,
            AttackKind::OnOff { .. } => match self.state {
                BehaviorState::Bad => Verdict::Drop,
                BehaviorState::Good => Verdict::Forward,
            },
        }
    }

    /// Enters `state` and returns how long to stay in it.
    ///
    /// Static categories record the state but always report the long
    /// recheck interval since their verdict never changes.
    pub fn enter_state(&mut self, state: BehaviorState) -> Duration {
        self.state = state;
        match self.kind {
            AttackKind::OnOff {
                good_dwell,
                bad_dwell,
            } => {
                debug!(node = self.node, ?state, "adversary switching phase");
                match state {
                    BehaviorState::Good => good_dwell,
                    BehaviorState::Bad => bad_dwell,
                }
            }
            AttackKind::Blackhole | AttackKind::Grayhole { .. } => STATIC_ATTACK_RECHECK,
        }
    }

    /// Enables or disables the attack.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> AttackKind {
        self.kind
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blackhole_drops_everything() {
        let adversary = Adversary::new(5, AttackKind::Blackhole);
        for class in TrafficClass::ALL {
            assert_eq!(adversary.process_packet(class), Verdict::Drop);
        }
    }

    #[test]
    fn test_grayhole_drops_only_target_class() {
        let adversary = Adversary::new(5, AttackKind::grayhole());
        assert_eq!(adversary.process_packet(TrafficClass::Data), Verdict::Drop);
        assert_eq!(
            adversary.process_packet(TrafficClass::Voice),
            Verdict::Forward
        );
    }

    #[test]
    fn test_on_off_follows_state() {
        let mut adversary = Adversary::new(9, AttackKind::on_off());
        assert_eq!(adversary.enter_state(BehaviorState::Good), DEFAULT_GOOD_DWELL);
        assert_eq!(
            adversary.process_packet(TrafficClass::Data),
            Verdict::Forward
        );

        assert_eq!(adversary.enter_state(BehaviorState::Bad), DEFAULT_BAD_DWELL);
        assert_eq!(adversary.process_packet(TrafficClass::Voice), Verdict::Drop);
    }

    #[test]
    fn test_inactive_adversary_forwards() {
        let mut adversary = Adversary::new(1, AttackKind::Blackhole);
        adversary.set_active(false);
        assert_eq!(
            adversary.process_packet(TrafficClass::Data),
            Verdict::Forward
        );
    }

    #[test]
    fn test_static_attack_uses_long_recheck() {
        let mut adversary = Adversary::new(1, AttackKind::Blackhole);
        assert_eq!(
            adversary.enter_state(BehaviorState::Bad),
            STATIC_ATTACK_RECHECK
        );
        assert_eq!(adversary.process_packet(TrafficClass::Data), Verdict::Drop);
    }
}
