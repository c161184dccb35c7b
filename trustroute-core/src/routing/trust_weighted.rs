//! Dijkstra over trust-inflated link costs.

use super::shortest_path::dijkstra;
use super::{RoutingContext, RoutingStrategy};
use crate::network::NodeId;

/// Cost multiplier applied to a fully distrusted next hop.
pub const TRUST_PENALTY: f64 = 10.0;

/// Routes around nodes the trust model has seen misbehave.
///
/// Moving onto `v` costs `weight * (1 + penalty * (1 - trust(v)))`, read
/// from the live trust table on each call.
#[derive(Debug, Clone, Copy)]
pub struct TrustWeightedRouting {
    penalty: f64,
}

impl TrustWeightedRouting {
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty: penalty.max(0.0),
        }
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }
}

impl Default for TrustWeightedRouting {
    fn default() -> Self {
        Self::new(TRUST_PENALTY)
    }
}

impl RoutingStrategy for TrustWeightedRouting {
    fn name(&self) -> &'static str {
        "trust-weighted"
    }

    fn find_path(
        &self,
        ctx: &mut RoutingContext<'_>,
        source: NodeId,
        destination: NodeId,
    ) -> Option<Vec<NodeId>> {
        let trust = ctx.trust;
        dijkstra(ctx.network, source, destination, |_, to, link| {
            let distrust = 1.0 - trust.get_trust(to).clamp(0.0, 1.0);
            link.weight * (1.0 + self.penalty * distrust)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::test_support::{agent, diamond};
    use crate::trust::TrustModel;

    #[test]
    fn test_detours_around_distrusted_node() {
        let network = diamond();
        let mut trust = TrustModel::default();
        let mut agent = agent(&network);

        // 0.95^60 ~= 0.046, so entering node 1 costs ~10.5
        for _ in 0..60 {
            trust.update_trust(1, false);
        }
        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
        assert_eq!(
            TrustWeightedRouting::default().find_path(&mut ctx, 0, 3),
            Some(vec![0, 2, 3])
        );
    }

    #[test]
    fn test_recovered_trust_restores_short_route() {
        let network = diamond();
        let mut trust = TrustModel::default();
        let mut agent = agent(&network);
        for _ in 0..60 {
            trust.update_trust(1, false);
        }
        for _ in 0..20 {
            trust.update_trust(1, true);
        }

        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
        assert_eq!(
            TrustWeightedRouting::default().find_path(&mut ctx, 0, 3),
            Some(vec![0, 1, 3])
        );
    }

    #[test]
    fn test_zero_penalty_matches_shortest_path() {
        let network = diamond();
        let mut trust = TrustModel::default();
        for _ in 0..100 {
            trust.update_trust(1, false);
        }
        let mut agent = agent(&network);
        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);

        assert_eq!(
            TrustWeightedRouting::new(0.0).find_path(&mut ctx, 0, 3),
            Some(vec![0, 1, 3])
        );
    }
}
