//! Per-run statistics and packet traces.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use trustroute_core::{DeliveryOutcome, DropCause, Flow, NodeId, TrafficClass};

/// Outcome label of a packet trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceStatus {
    Success,
    Dropped,
    NoPath,
}

impl TraceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TraceStatus::Success => "Success",
            TraceStatus::Dropped => "Dropped",
            TraceStatus::NoPath => "No Path",
        }
    }
}

/// One routed packet as seen by a dashboard collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketTrace {
    /// Simulation time in seconds
    pub timestamp: f64,
    pub algorithm: &'static str,
    pub source: NodeId,
    pub destination: NodeId,
    pub class: TrafficClass,
    pub path: Option<Vec<NodeId>>,
    pub status: TraceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_at: Option<NodeId>,
}

/// Attempt and delivery counters for one traffic class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassStats {
    pub attempted: u64,
    pub delivered: u64,
}

impl ClassStats {
    /// Delivered over attempted, 0.0 when nothing was attempted.
    pub fn delivery_ratio(&self) -> f64 {
        ratio(self.delivered, self.attempted)
    }
}

/// Counters accumulated by traffic processes during a run.
///
/// `attempted` counts packets handed to a routing strategy; packets skipped
/// before routing are counted separately.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    pub attempted: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub no_path: u64,
    pub skipped: u64,
    pub per_class: BTreeMap<TrafficClass, ClassStats>,
    pub drops_by_node: BTreeMap<NodeId, u64>,
    pub drops_by_cause: BTreeMap<DropCause, u64>,
    /// Sum of link weights over delivered paths
    pub delivered_latency: f64,
    pub traces: Vec<PacketTrace>,
    /// Trace records discarded once the history was full
    pub traces_discarded: u64,
    #[serde(skip)]
    trace_capacity: usize,
}

impl RunStatistics {
    /// Creates empty statistics keeping at most `trace_capacity` traces.
    pub fn new(trace_capacity: usize) -> Self {
        Self {
            attempted: 0,
            delivered: 0,
            dropped: 0,
            no_path: 0,
            skipped: 0,
            per_class: BTreeMap::new(),
            drops_by_node: BTreeMap::new(),
            drops_by_cause: BTreeMap::new(),
            delivered_latency: 0.0,
            traces: Vec::new(),
            traces_discarded: 0,
            trace_capacity,
        }
    }

    /// Records a packet for which no route was found.
    pub fn record_no_path(&mut self, now: Duration, algorithm: &'static str, flow: Flow) {
        self.count_attempt(flow.class);
        self.no_path += 1;
        self.push_trace(PacketTrace {
            timestamp: now.as_secs_f64(),
            algorithm,
            source: flow.source,
            destination: flow.destination,
            class: flow.class,
            path: None,
            status: TraceStatus::NoPath,
            dropped_at: None,
        });
    }

    /// Records the delivery outcome of a routed packet.
    pub fn record_delivery(
        &mut self,
        now: Duration,
        algorithm: &'static str,
        flow: Flow,
        path: Vec<NodeId>,
        outcome: DeliveryOutcome,
        latency: f64,
    ) {
        self.count_attempt(flow.class);
        let (status, dropped_at) = match outcome {
            DeliveryOutcome::Delivered { .. } => {
                self.delivered += 1;
                self.delivered_latency += latency;
                if let Some(class) = self.per_class.get_mut(&flow.class) {
                    class.delivered += 1;
                }
                (TraceStatus::Success, None)
            }
            DeliveryOutcome::Dropped { node, cause } => {
                self.dropped += 1;
                *self.drops_by_node.entry(node).or_insert(0) += 1;
                *self.drops_by_cause.entry(cause).or_insert(0) += 1;
                (TraceStatus::Dropped, Some(node))
            }
            DeliveryOutcome::EmptyPath => {
                self.dropped += 1;
                (TraceStatus::Dropped, None)
            }
        };
        self.push_trace(PacketTrace {
            timestamp: now.as_secs_f64(),
            algorithm,
            source: flow.source,
            destination: flow.destination,
            class: flow.class,
            path: Some(path),
            status,
            dropped_at,
        });
    }

    /// Records a packet discarded before routing.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    fn count_attempt(&mut self, class: TrafficClass) {
        self.attempted += 1;
        self.per_class.entry(class).or_default().attempted += 1;
    }

    fn push_trace(&mut self, trace: PacketTrace) {
        if self.traces.len() < self.trace_capacity {
            self.traces.push(trace);
        } else {
            self.traces_discarded += 1;
        }
    }

    /// Delivered over attempted.
    pub fn delivery_ratio(&self) -> f64 {
        ratio(self.delivered, self.attempted)
    }

    /// Delivery ratio of one class, 0.0 when the class was never sent.
    pub fn class_delivery_ratio(&self, class: TrafficClass) -> f64 {
        self.per_class
            .get(&class)
            .map_or(0.0, ClassStats::delivery_ratio)
    }

    /// Mean path latency of delivered packets.
    pub fn mean_latency(&self) -> Option<f64> {
        (self.delivered > 0).then(|| self.delivered_latency / self.delivered as f64)
    }

    /// Node that dropped the most packets, lowest id on ties.
    pub fn worst_node(&self) -> Option<(NodeId, u64)> {
        self.drops_by_node
            .iter()
            .map(|(&node, &count)| (node, count))
            .fold(None, |best, (node, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((node, count)),
            })
    }

    /// Clears every counter and trace, keeping the trace capacity.
    pub fn reset(&mut self) {
        *self = Self::new(self.trace_capacity);
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(class: TrafficClass) -> Flow {
        Flow::new(0, 2, class)
    }

    #[test]
    fn test_counters_follow_outcomes() {
        let mut stats = RunStatistics::new(10);
        let now = Duration::from_millis(1500);

        stats.record_delivery(
            now,
            "hop-count",
            flow(TrafficClass::Voice),
            vec![0, 1, 2],
            DeliveryOutcome::Delivered { hops: 2 },
            4.0,
        );
        stats.record_delivery(
            now,
            "hop-count",
            flow(TrafficClass::Data),
            vec![0, 1, 2],
            DeliveryOutcome::Dropped {
                node: 1,
                cause: DropCause::Adversary,
            },
            4.0,
        );
        stats.record_no_path(now, "hop-count", flow(TrafficClass::Data));
        stats.record_skipped();

        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.no_path, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.class_delivery_ratio(TrafficClass::Voice), 1.0);
        assert_eq!(stats.class_delivery_ratio(TrafficClass::Data), 0.0);
        assert_eq!(stats.drops_by_cause.get(&DropCause::Adversary), Some(&1));
        assert_eq!(stats.worst_node(), Some((1, 1)));
        assert_eq!(stats.mean_latency(), Some(4.0));

        let statuses: Vec<_> = stats.traces.iter().map(|t| t.status.as_str()).collect();
        assert_eq!(statuses, vec!["Success", "Dropped", "No Path"]);
        assert_eq!(stats.traces[0].timestamp, 1.5);
    }

    #[test]
    fn test_trace_history_is_bounded() {
        let mut stats = RunStatistics::new(2);
        for _ in 0..5 {
            stats.record_no_path(Duration::ZERO, "shortest-path", flow(TrafficClass::Data));
        }
        assert_eq!(stats.traces.len(), 2);
        assert_eq!(stats.traces_discarded, 3);
        assert_eq!(stats.attempted, 5);

        stats.reset();
        assert_eq!(stats.attempted, 0);
        assert!(stats.traces.is_empty());
        assert_eq!(stats.delivery_ratio(), 0.0);
        assert_eq!(stats.mean_latency(), None);
    }
}
