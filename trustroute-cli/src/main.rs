//! Trustroute CLI - Command-line interface
//!
//! Runs the routing experiments and prints their reports.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use trustroute_core::TrustrouteConfig;
use trustroute_core::tracing_setup::{CliLogLevel, init_tracing};

/// Main CLI structure.
///
/// Global options override the environment-derived configuration before a
/// subcommand runs.
#[derive(Parser)]
#[command(name = "trustroute")]
#[command(about = "Trust-aware and reinforcement-learning routing simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Seed for topology, traffic and delivery randomness
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of nodes in the generated topology
    #[arg(long, global = true)]
    nodes: Option<usize>,

    /// Link probability between any two nodes
    #[arg(long, global = true)]
    density: Option<f64>,

    /// Packets to generate per run
    #[arg(long, global = true)]
    packets: Option<u64>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Console log level
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Directory for the per-run trace log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> TrustrouteConfig {
        let mut config = TrustrouteConfig::from_env();
        if let Some(seed) = self.seed {
            config.topology.seed = seed;
        }
        if let Some(nodes) = self.nodes {
            config.topology.num_nodes = nodes;
        }
        if let Some(density) = self.density {
            config.topology.density = density;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    let options = commands::RunOptions {
        config: cli.config(),
        packets: cli.packets,
        json: cli.json,
    };
    commands::handle_command(cli.command, &options)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "trustroute",
            "compare",
            "--seed",
            "7",
            "--nodes",
            "12",
            "--density",
            "0.4",
        ]);
        let config = cli.config();
        assert_eq!(config.topology.seed, 7);
        assert_eq!(config.topology.num_nodes, 12);
        assert_eq!(config.topology.density, 0.4);
    }

    #[test]
    fn test_attack_kind_parses() {
        let cli = Cli::parse_from(["trustroute", "attack", "--kind", "on-off"]);
        assert!(matches!(
            cli.command,
            commands::Commands::Attack {
                kind: Some(commands::AttackArg::OnOff),
                ..
            }
        ));
    }
}
