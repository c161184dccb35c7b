//! Shared state processes operate on.

use trustroute_core::{
    DeterministicRng, NetworkState, QRoutingAgent, TrustModel, TrustrouteConfig,
};

use super::state::RunStatistics;

/// Salt for the agent's exploration stream.
const AGENT_STREAM: u64 = 0xA6E7;

/// Everything a process may read or mutate while it is resumed.
///
/// Only one process runs at a time, so each gets exclusive access for the
/// duration of its resumption.
#[derive(Debug)]
pub struct World {
    pub network: NetworkState,
    pub trust: TrustModel,
    pub agent: QRoutingAgent,
    pub stats: RunStatistics,
}

impl World {
    pub fn new(
        network: NetworkState,
        trust: TrustModel,
        agent: QRoutingAgent,
        trace_capacity: usize,
    ) -> Self {
        Self {
            network,
            trust,
            agent,
            stats: RunStatistics::new(trace_capacity),
        }
    }

    /// Builds the network, a fresh trust model and an untrained agent.
    ///
    /// # Errors
    ///
    /// - `TrustrouteError::Network` - Topology parameters are invalid
    /// - `TrustrouteError::Trust` - Trust parameters are invalid
    /// - `TrustrouteError::Agent` - Agent parameters are invalid
    pub fn from_config(config: &TrustrouteConfig) -> trustroute_core::Result<Self> {
        let network = NetworkState::from_config(config)?;
        Self::with_network(network, config)
    }

    /// Wraps an existing network with trust and agent state from `config`.
    ///
    /// # Errors
    ///
    /// - `TrustrouteError::Trust` - Trust parameters are invalid
    /// - `TrustrouteError::Agent` - Agent parameters are invalid
    pub fn with_network(
        network: NetworkState,
        config: &TrustrouteConfig,
    ) -> trustroute_core::Result<Self> {
        let trust = TrustModel::new(&config.trust)?;
        let agent = QRoutingAgent::new(
            &network.node_ids(),
            &config.agent,
            DeterministicRng::derive_seed(config.topology.seed, AGENT_STREAM),
        )?;
        Ok(Self::new(
            network,
            trust,
            agent,
            config.simulation.trace_history,
        ))
    }
}
