//! Tabular Q-learning agent choosing next hops.
//!
//! The agent is reward-agnostic: callers decide how delivery outcomes map
//! to rewards and feed them through [`QRoutingAgent::learn`].

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::config::AgentConfig;
use crate::network::NodeId;
use crate::rng::DeterministicRng;

/// Errors raised while constructing or tuning the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent requires at least one node")]
    EmptyNodeSet,

    #[error("Invalid agent parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Epsilon-greedy Q-routing agent over (node, next hop) pairs.
#[derive(Debug, Clone)]
pub struct QRoutingAgent {
    q_table: HashMap<(NodeId, NodeId), f64>,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    node_count: usize,
    rng: DeterministicRng,
}

impl QRoutingAgent {
    /// Creates an agent for the given node set.
    ///
    /// # Errors
    ///
    /// - `AgentError::EmptyNodeSet` - `nodes` is empty
    /// - `AgentError::InvalidParameter` - alpha outside (0, 1], gamma or epsilon outside [0, 1]
    pub fn new(nodes: &[NodeId], config: &AgentConfig, seed: u64) -> Result<Self, AgentError> {
        if nodes.is_empty() {
            return Err(AgentError::EmptyNodeSet);
        }
        if !(config.alpha > 0.0 && config.alpha <= 1.0) {
            return Err(AgentError::InvalidParameter {
                name: "alpha",
                value: config.alpha,
            });
        }
        if !(0.0..=1.0).contains(&config.gamma) {
            return Err(AgentError::InvalidParameter {
                name: "gamma",
                value: config.gamma,
            });
        }
        check_epsilon(config.epsilon)?;

        Ok(Self {
            q_table: HashMap::new(),
            alpha: config.alpha,
            gamma: config.gamma,
            epsilon: config.epsilon,
            node_count: nodes.len(),
            rng: DeterministicRng::from_seed(seed),
        })
    }

    /// Stored value for choosing `action` at `state`, 0.0 if never visited.
    pub fn q_value(&self, state: NodeId, action: NodeId) -> f64 {
        self.q_table.get(&(state, action)).copied().unwrap_or(0.0)
    }

    /// Picks the next hop among `neighbors`.
    ///
    /// Explores uniformly with probability epsilon, otherwise picks a
    /// maximum-value neighbor with ties broken uniformly at random.
    pub fn choose_action(&mut self, current: NodeId, neighbors: &[NodeId]) -> Option<NodeId> {
        if neighbors.is_empty() {
            return None;
        }

        if self.rng.random_f64() < self.epsilon {
            return self.rng.choose(neighbors).copied();
        }

        let max_q = neighbors
            .iter()
            .map(|&n| self.q_value(current, n))
            .fold(f64::NEG_INFINITY, f64::max);
        let best: Vec<NodeId> = neighbors
            .iter()
            .copied()
            .filter(|&n| self.q_value(current, n) == max_q)
            .collect();

        self.rng.choose(&best).copied()
    }

    /// Applies one temporal-difference update.
    ///
    /// An empty `next_neighbors` marks a terminal or dead-end state whose
    /// future value is zero.
    pub fn learn(
        &mut self,
        state: NodeId,
        action: NodeId,
        reward: f64,
        next_state: NodeId,
        next_neighbors: &[NodeId],
    ) {
        let current_q = self.q_value(state, action);
        let max_next_q = next_neighbors
            .iter()
            .map(|&n| self.q_value(next_state, n))
            .reduce(f64::max)
            .unwrap_or(0.0);

        let updated = current_q + self.alpha * (reward + self.gamma * max_next_q - current_q);
        self.q_table.insert((state, action), updated);
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Changes the exploration rate without touching learned values.
    ///
    /// # Errors
    ///
    /// - `AgentError::InvalidParameter` - epsilon outside [0, 1]
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), AgentError> {
        check_epsilon(epsilon)?;
        debug!(from = self.epsilon, to = epsilon, "agent exploration rate changed");
        self.epsilon = epsilon;
        Ok(())
    }

    /// Learning rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Discount factor.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Number of nodes the agent was created for.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of visited (state, action) pairs.
    pub fn table_len(&self) -> usize {
        self.q_table.len()
    }
}

fn check_epsilon(epsilon: f64) -> Result<(), AgentError> {
    if (0.0..=1.0).contains(&epsilon) {
        Ok(())
    } else {
        Err(AgentError::InvalidParameter {
            name: "epsilon",
            value: epsilon,
        })
    }
}
