//! Reputation tracking from observed forwarding outcomes.
//!
//! Recovery is additive and penalties are multiplicative, so trust erodes
//! fast under repeated failure while a few lucky successes do not fully
//! rehabilitate a node that misbehaved before.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use crate::config::TrustConfig;
use crate::network::NodeId;

/// Errors raised while constructing a trust model.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("Invalid trust configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Per-node reputation scores clamped to [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct TrustModel {
    scores: BTreeMap<NodeId, f64>,
    initial_trust: f64,
    decay_factor: f64,
    bonus_factor: f64,
}

impl Default for TrustModel {
    fn default() -> Self {
        Self {
            scores: BTreeMap::new(),
            initial_trust: 1.0,
            decay_factor: 0.95,
            bonus_factor: 0.05,
        }
    }
}

impl TrustModel {
    /// Creates a trust model from validated parameters.
    ///
    /// # Errors
    ///
    /// - `TrustError::InvalidConfig` - Initial trust outside [0, 1], decay outside [0, 1) or negative bonus
    pub fn new(config: &TrustConfig) -> Result<Self, TrustError> {
        if !(0.0..=1.0).contains(&config.initial_trust) {
            return Err(TrustError::InvalidConfig {
                reason: format!("initial trust {} outside [0, 1]", config.initial_trust),
            });
        }
        if !(0.0..1.0).contains(&config.decay_factor) {
            return Err(TrustError::InvalidConfig {
                reason: format!("decay factor {} outside [0, 1)", config.decay_factor),
            });
        }
        if config.bonus_factor.is_nan() || config.bonus_factor < 0.0 {
            return Err(TrustError::InvalidConfig {
                reason: format!("bonus factor {} is negative", config.bonus_factor),
            });
        }

        Ok(Self {
            scores: BTreeMap::new(),
            initial_trust: config.initial_trust,
            decay_factor: config.decay_factor,
            bonus_factor: config.bonus_factor,
        })
    }

    /// Records one forwarding outcome for `node`.
    pub fn update_trust(&mut self, node: NodeId, success: bool) {
        let current = self.scores.entry(node).or_insert(self.initial_trust);
        let updated = if success {
            (*current + self.bonus_factor).min(1.0)
        } else {
            (*current * self.decay_factor).max(0.0)
        };
        trace!(node, success, from = *current, to = updated, "trust updated");
        *current = updated;
    }

    /// Returns the current score, or the initial trust if never observed.
    pub fn get_trust(&self, node: NodeId) -> f64 {
        self.scores
            .get(&node)
            .copied()
            .unwrap_or(self.initial_trust)
    }

    /// Score assumed for unobserved nodes.
    pub fn initial_trust(&self) -> f64 {
        self.initial_trust
    }

    /// Iterates over observed nodes and their scores in node order.
    pub fn scores(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.scores.iter().map(|(node, score)| (*node, *score))
    }

    /// Number of nodes with at least one recorded observation.
    pub fn observed_nodes(&self) -> usize {
        self.scores.len()
    }

    /// Forgets every observation.
    pub fn reset(&mut self) {
        self.scores.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> TrustModel {
        TrustModel::new(&TrustConfig::default()).unwrap()
    }

    #[test]
    fn test_unobserved_node_has_initial_trust() {
        let trust = model();
        assert_eq!(trust.get_trust(4), 1.0);
        assert_eq!(trust.observed_nodes(), 0);
    }

    #[test]
    fn test_failure_is_multiplicative() {
        let mut trust = model();
        trust.update_trust(1, false);
        assert!((trust.get_trust(1) - 0.95).abs() < 1e-12);
        trust.update_trust(1, false);
        assert!((trust.get_trust(1) - 0.9025).abs() < 1e-12);
    }

    #[test]
    fn test_success_is_additive_and_capped() {
        let mut trust = TrustModel::new(&TrustConfig {
            initial_trust: 0.5,
            ..Default::default()
        })
        .unwrap();

        trust.update_trust(2, true);
        assert!((trust.get_trust(2) - 0.55).abs() < 1e-12);

        for _ in 0..20 {
            trust.update_trust(2, true);
        }
        assert_eq!(trust.get_trust(2), 1.0);
    }

    #[test]
    fn test_decay_trajectory_is_geometric_recovery_linear() {
        let mut decaying = model();
        for _ in 0..10 {
            decaying.update_trust(0, false);
        }
        assert!((decaying.get_trust(0) - 0.95f64.powi(10)).abs() < 1e-12);

        let mut recovering = TrustModel::new(&TrustConfig {
            initial_trust: 0.0,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..10 {
            recovering.update_trust(0, true);
        }
        assert!((recovering.get_trust(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_failure_after_successes_costs_less_than_repeated_failures() {
        let n = 10;

        let mut lucky = model();
        for _ in 0..n {
            lucky.update_trust(3, true);
        }
        lucky.update_trust(3, false);

        let mut unlucky = model();
        unlucky.update_trust(3, true);
        for _ in 0..n {
            unlucky.update_trust(3, false);
        }

        assert!(unlucky.get_trust(3) < lucky.get_trust(3));
        assert!((lucky.get_trust(3) - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = TrustModel::new(&TrustConfig {
            decay_factor: 1.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(TrustError::InvalidConfig { .. })));

        let result = TrustModel::new(&TrustConfig {
            initial_trust: 1.5,
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_reset_forgets_scores() {
        let mut trust = model();
        trust.update_trust(1, false);
        trust.reset();
        assert_eq!(trust.get_trust(1), 1.0);
    }
}
