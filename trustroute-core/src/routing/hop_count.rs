//! Breadth-first fewest-hop routing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::shortest_path::walk_back;
use super::{Endpoints, RoutingContext, RoutingStrategy, classify_endpoints};
use crate::network::NodeId;

/// RIP-like routing: minimum hop count, link weights ignored.
///
/// Neighbors are expanded in ascending order, so among equal-length
/// routes the lexicographically smallest is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct HopCountRouting;

impl RoutingStrategy for HopCountRouting {
    fn name(&self) -> &'static str {
        "hop-count"
    }

    fn find_path(
        &self,
        ctx: &mut RoutingContext<'_>,
        source: NodeId,
        destination: NodeId,
    ) -> Option<Vec<NodeId>> {
        match classify_endpoints(ctx.network, source, destination) {
            Endpoints::Unknown => return None,
            Endpoints::Same => return Some(vec![source]),
            Endpoints::Distinct => {}
        }

        let mut visited = BTreeSet::from([source]);
        let mut previous = BTreeMap::new();
        let mut queue = VecDeque::from([source]);

        while let Some(node) = queue.pop_front() {
            for next in ctx.network.neighbors(node) {
                if !visited.insert(next) {
                    continue;
                }
                previous.insert(next, node);
                if next == destination {
                    return Some(walk_back(&previous, source, destination));
                }
                queue.push_back(next);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NetworkState, Topology};
    use crate::routing::test_support::agent;
    use crate::trust::TrustModel;

    #[test]
    fn test_prefers_fewer_hops_over_latency() {
        let topology =
            Topology::from_edges(4, &[(0, 3, 10.0), (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)])
                .unwrap();
        let network = NetworkState::with_defaults(topology, 1);
        let trust = TrustModel::default();
        let mut agent = agent(&network);
        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);

        assert_eq!(HopCountRouting.find_path(&mut ctx, 0, 3), Some(vec![0, 3]));
        assert_eq!(HopCountRouting.find_path(&mut ctx, 3, 1), Some(vec![3, 0, 1]));
    }

    #[test]
    fn test_tie_breaks_on_lowest_neighbor() {
        let topology =
            Topology::from_edges(4, &[(0, 2, 1.0), (0, 1, 9.0), (1, 3, 9.0), (2, 3, 1.0)])
                .unwrap();
        let network = NetworkState::with_defaults(topology, 1);
        let trust = TrustModel::default();
        let mut agent = agent(&network);
        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);

        assert_eq!(HopCountRouting.find_path(&mut ctx, 0, 3), Some(vec![0, 1, 3]));
    }
}
