//! Traffic classes and ephemeral packet flows.

use std::fmt;

use serde::Serialize;

use crate::network::NodeId;

/// Priority class of a packet.
///
/// Voice is the high-priority class and is shielded from most congestion
/// loss; data is the low-priority class grayhole adversaries target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficClass {
    Data,
    Voice,
}

impl TrafficClass {
    /// All classes, lowest priority first.
    pub const ALL: [TrafficClass; 2] = [TrafficClass::Data, TrafficClass::Voice];

    /// Numeric priority level, higher is more important.
    pub fn priority(self) -> u8 {
        match self {
            TrafficClass::Data => 0,
            TrafficClass::Voice => 1,
        }
    }

    /// Returns string representation for traces and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficClass::Data => "data",
            TrafficClass::Voice => "voice",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single packet attempt before routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    pub source: NodeId,
    pub destination: NodeId,
    pub class: TrafficClass,
}

impl Flow {
    /// Creates a flow between two nodes.
    pub fn new(source: NodeId, destination: NodeId, class: TrafficClass) -> Self {
        Self {
            source,
            destination,
            class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_outranks_data() {
        assert!(TrafficClass::Voice.priority() > TrafficClass::Data.priority());
        assert_eq!(TrafficClass::Voice.to_string(), "voice");
    }
}
