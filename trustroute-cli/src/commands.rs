//! CLI command implementations

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use trustroute_core::{AttackKind, RoutingAlgorithm, TrustrouteConfig};
use trustroute_sim::{
    AttackScenario, ComparisonScenario, QosScenario, ScenarioRunner, TrainingScenario,
};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compare routing algorithms on the same seeded topology
    Compare {
        /// Algorithms to run, all of them when omitted
        #[arg(short, long, value_enum, value_delimiter = ',')]
        algorithms: Vec<RoutingAlgorithm>,
    },
    /// Mixed voice and data traffic over congested links
    Qos {
        #[arg(short, long, value_enum, default_value_t = RoutingAlgorithm::ShortestPath)]
        algorithm: RoutingAlgorithm,
    },
    /// Route around malicious nodes
    Attack {
        /// Attack category, every category when omitted
        #[arg(short, long, value_enum)]
        kind: Option<AttackArg>,
        #[arg(short, long, value_enum, default_value_t = RoutingAlgorithm::TrustWeighted)]
        algorithm: RoutingAlgorithm,
    },
    /// Train the Q-routing agent, then exploit the learned table
    Train {
        /// Packets routed with the exploitation epsilon
        #[arg(long, default_value_t = 50)]
        exploitation_packets: u64,
    },
}

/// Attack category selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttackArg {
    Blackhole,
    Grayhole,
    OnOff,
}

impl From<AttackArg> for AttackKind {
    fn from(arg: AttackArg) -> Self {
        match arg {
            AttackArg::Blackhole => AttackKind::Blackhole,
            AttackArg::Grayhole => AttackKind::grayhole(),
            AttackArg::OnOff => AttackKind::on_off(),
        }
    }
}

/// Settings shared by every command.
pub struct RunOptions {
    pub config: TrustrouteConfig,
    /// Overrides the scenario's packet count
    pub packets: Option<u64>,
    pub json: bool,
}

/// Handle the CLI command
///
/// # Errors
/// Returns the simulation failure of the command, or a serialization error
/// when JSON output was requested
pub fn handle_command(command: Commands, options: &RunOptions) -> anyhow::Result<()> {
    let runner = ScenarioRunner::new(options.config.clone());
    info!(seed = options.config.topology.seed, "running command");

    match command {
        Commands::Compare { algorithms } => {
            let algorithms = if algorithms.is_empty() {
                RoutingAlgorithm::ALL.to_vec()
            } else {
                algorithms
            };
            let mut scenario = ComparisonScenario::default();
            if let Some(packets) = options.packets {
                scenario.packets = packets;
            }
            let results = runner
                .compare(&algorithms, &scenario)
                .context("comparison run failed")?;
            emit(options.json, &results, || results.summary())
        }
        Commands::Qos { algorithm } => {
            let mut scenario = QosScenario::default();
            if let Some(packets) = options.packets {
                scenario.packets = packets;
            }
            let result = runner
                .qos(algorithm, &scenario)
                .context("QoS run failed")?;
            emit(options.json, &result, || result.report.summary())
        }
        Commands::Attack { kind, algorithm } => {
            let mut scenario = AttackScenario::default();
            if let Some(packets) = options.packets {
                scenario.packets = packets;
            }
            match kind {
                Some(kind) => {
                    let result = runner
                        .attack(kind.into(), algorithm, &scenario)
                        .context("attack run failed")?;
                    emit(options.json, &result, || result.report.summary())
                }
                None => {
                    let results = runner
                        .attack_all(algorithm, &scenario)
                        .context("attack run failed")?;
                    emit(options.json, &results, || results.summary())
                }
            }
        }
        Commands::Train {
            exploitation_packets,
        } => {
            let mut scenario = TrainingScenario {
                exploitation_packets,
                ..Default::default()
            };
            if let Some(packets) = options.packets {
                scenario.training_packets = packets;
            }
            let result = runner.train(&scenario).context("training run failed")?;
            emit(options.json, &result, || result.summary())
        }
    }
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    summary: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", summary());
    }
    Ok(())
}
