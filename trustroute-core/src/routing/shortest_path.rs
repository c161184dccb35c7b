//! Latency-weighted Dijkstra.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use super::{Endpoints, RoutingContext, RoutingStrategy, classify_endpoints};
use crate::network::{Link, NetworkState, NodeId};

/// OSPF-like routing: minimum total link weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPathRouting;

impl RoutingStrategy for ShortestPathRouting {
    fn name(&self) -> &'static str {
        "shortest-path"
    }

    fn find_path(
        &self,
        ctx: &mut RoutingContext<'_>,
        source: NodeId,
        destination: NodeId,
    ) -> Option<Vec<NodeId>> {
        dijkstra(ctx.network, source, destination, |_, _, link| link.weight)
    }
}

/// Frontier entry ordered so the cheapest node surfaces first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, lower node id wins ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Minimum-cost path under `edge_cost(from, to, link)`.
///
/// Costs must be non-negative.
pub(super) fn dijkstra<F>(
    network: &NetworkState,
    source: NodeId,
    destination: NodeId,
    edge_cost: F,
) -> Option<Vec<NodeId>>
where
    F: Fn(NodeId, NodeId, &Link) -> f64,
{
    match classify_endpoints(network, source, destination) {
        Endpoints::Unknown => return None,
        Endpoints::Same => return Some(vec![source]),
        Endpoints::Distinct => {}
    }

    let topology = network.topology();
    let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
    let mut previous: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut frontier = BinaryHeap::new();

    dist.insert(source, 0.0);
    frontier.push(Frontier {
        cost: 0.0,
        node: source,
    });

    while let Some(Frontier { cost, node }) = frontier.pop() {
        if node == destination {
            return Some(walk_back(&previous, source, destination));
        }
        if dist.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        for next in topology.neighbors(node) {
            let Some(link) = topology.link(node, next) else {
                continue;
            };
            let candidate = cost + edge_cost(node, next, link);
            if dist.get(&next).is_none_or(|&best| candidate < best) {
                dist.insert(next, candidate);
                previous.insert(next, node);
                frontier.push(Frontier {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    None
}

/// Rebuilds the path from predecessor links.
pub(super) fn walk_back(
    previous: &BTreeMap<NodeId, NodeId>,
    source: NodeId,
    destination: NodeId,
) -> Vec<NodeId> {
    let mut path = vec![destination];
    let mut current = destination;
    while current != source {
        match previous.get(&current) {
            Some(&before) => {
                path.push(before);
                current = before;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
